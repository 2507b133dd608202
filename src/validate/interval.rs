use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::Context;

use super::issue::{ValidationIssue, ValidationResult};
use crate::config::ValidatorConfig;
use crate::error::{CoreError, Result};

/// One logged unit of an interval table. Bounds are optional because the
/// source rows may be incomplete; that is reported, never rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DepthInterval {
    /// Row number in the caller's table.
    pub row: usize,
    pub from_depth: Option<f64>,
    pub to_depth: Option<f64>,
    pub thickness: Option<f64>,
    /// Coded fields (lithology, colour, ...) by column name.
    pub codes: BTreeMap<String, String>,
}

impl DepthInterval {
    pub fn new(row: usize, from_depth: f64, to_depth: f64) -> Self {
        Self {
            row,
            from_depth: Some(from_depth),
            to_depth: Some(to_depth),
            ..Self::default()
        }
    }

    pub fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = Some(thickness);
        self
    }

    pub fn with_code(mut self, column: impl Into<String>, code: impl Into<String>) -> Self {
        self.codes.insert(column.into(), code.into());
        self
    }

    /// Top of the interval; NaN and infinities count as missing.
    pub fn top(&self) -> Option<f64> {
        self.from_depth.filter(|d| d.is_finite())
    }

    /// Base of the interval; NaN and infinities count as missing.
    pub fn base(&self) -> Option<f64> {
        self.to_depth.filter(|d| d.is_finite())
    }

    fn bounds(&self) -> Option<(f64, f64)> {
        Some((self.top()?, self.base()?))
    }
}

/// Stateless checker for interval tables.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Check intervals for missing, inverted and negative bounds, gaps and
    /// overlaps between neighbours, total-depth agreement, duplicate ranges
    /// and thickness consistency. Rows are sorted by `from_depth` first
    /// (stable; rows without one go last).
    pub fn validate(&self, intervals: &[DepthInterval], total_depth: Option<f64>) -> ValidationResult {
        let mut result = ValidationResult::default();
        if intervals.is_empty() {
            result.push(ValidationIssue::warning("no depth intervals to validate"));
            return result;
        }

        let mut sorted: Vec<&DepthInterval> = intervals.iter().collect();
        sorted.sort_by(|a, b| match (a.top(), b.top()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        for interval in &sorted {
            self.check_bounds(interval, &mut result);
        }
        self.check_neighbours(&sorted, &mut result);
        if let Some(total) = total_depth {
            self.check_total_depth(&sorted, total, &mut result);
        }
        if self.config.check_duplicates {
            check_duplicates(&sorted, &mut result);
        }
        if self.config.check_thickness {
            self.check_thickness(&sorted, &mut result);
        }
        result
    }

    fn check_bounds(&self, interval: &DepthInterval, result: &mut ValidationResult) {
        let row = interval.row;
        if interval.top().is_none() {
            result.push(ValidationIssue::error("missing from depth").at_row(row).in_column("from"));
        }
        if interval.base().is_none() {
            result.push(ValidationIssue::error("missing to depth").at_row(row).in_column("to"));
        }
        if let Some((from, to)) = interval.bounds() {
            if from >= to {
                result.push(
                    ValidationIssue::error(format!("from depth {from} is not less than to depth {to}"))
                        .at_row(row)
                        .with_value(format!("{from}-{to}")),
                );
            }
        }
        for (column, depth) in [("from", interval.top()), ("to", interval.base())] {
            if let Some(depth) = depth.filter(|d| *d < 0.0) {
                result.push(
                    ValidationIssue::error(format!("negative {column} depth {depth}"))
                        .at_row(row)
                        .in_column(column)
                        .with_value(depth.to_string()),
                );
            }
        }
    }

    fn check_neighbours(&self, sorted: &[&DepthInterval], result: &mut ValidationResult) {
        let tolerance = self.config.tolerance;
        for pair in sorted.windows(2) {
            let (current, next) = (pair[0], pair[1]);
            let (Some(end), Some(start)) = (current.base(), next.top()) else {
                continue;
            };
            let diff = start - end;
            if diff > tolerance {
                result.push(
                    ValidationIssue::error(format!(
                        "gap of {diff:.3} between rows {}, {}",
                        current.row, next.row
                    ))
                    .at_row(next.row)
                    .with_value(format!("{diff:.3}")),
                );
            } else if -diff > tolerance {
                result.push(
                    ValidationIssue::error(format!(
                        "overlap of {:.3} between rows {}, {}",
                        -diff, current.row, next.row
                    ))
                    .at_row(next.row)
                    .with_value(format!("{:.3}", -diff)),
                );
            }
        }
    }

    fn check_total_depth(&self, sorted: &[&DepthInterval], total: f64, result: &mut ValidationResult) {
        let Some(last) = sorted.last() else {
            return;
        };
        let Some(bottom) = last.base() else {
            return;
        };
        let diff = total - bottom;
        if diff.abs() > self.config.tolerance {
            result.push(
                ValidationIssue::warning(format!(
                    "total depth {total:.3} differs from last interval bottom {bottom:.3} by {diff:.3}"
                ))
                .at_row(last.row)
                .with_value(format!("{diff:.3}")),
            );
        }
    }

    fn check_thickness(&self, sorted: &[&DepthInterval], result: &mut ValidationResult) {
        for interval in sorted {
            let (Some(thickness), Some((from, to))) =
                (interval.thickness.filter(|t| t.is_finite()), interval.bounds())
            else {
                continue;
            };
            let expected = to - from;
            if (thickness - expected).abs() > self.config.tolerance {
                result.push(
                    ValidationIssue::warning(format!(
                        "thickness {thickness:.3} does not match interval length {expected:.3}"
                    ))
                    .at_row(interval.row)
                    .in_column("thickness")
                    .with_value(thickness.to_string()),
                );
            }
        }
    }
}

/// Ranges equal to three decimals are duplicates; the first one seen is kept.
fn check_duplicates(sorted: &[&DepthInterval], result: &mut ValidationResult) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for interval in sorted {
        let Some((from, to)) = interval.bounds() else {
            continue;
        };
        let key = format!("{from:.3}-{to:.3}");
        if let Some(first) = seen.get(&key) {
            result.push(
                ValidationIssue::warning(format!("duplicate interval {key}, same as row {first}"))
                    .at_row(interval.row)
                    .with_value(key),
            );
        } else {
            seen.insert(key, interval.row);
        }
    }
}

/// Validate with the default tolerance of 0.001.
pub fn validate_intervals(intervals: &[DepthInterval], total_depth: Option<f64>) -> ValidationResult {
    Validator::default().validate(intervals, total_depth)
}

// ---------------------------------------------------------------------------
// Reading interval tables
// ---------------------------------------------------------------------------

/// Header names of the bound columns. Matching is case-insensitive; every
/// other column is kept as a coded field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalColumns {
    pub from: String,
    pub to: String,
    pub thickness: String,
}

impl Default for IntervalColumns {
    fn default() -> Self {
        Self {
            from: "FROM".to_string(),
            to: "TO".to_string(),
            thickness: "THICKNESS".to_string(),
        }
    }
}

/// Read an interval table from CSV. Empty, non-numeric and non-finite
/// bounds become `None` so the validator can report them.
pub fn read_intervals_csv(path: &Path, columns: &IntervalColumns) -> Result<Vec<DepthInterval>> {
    std::fs::metadata(path).map_err(|source| CoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_intervals_csv(path, columns).map_err(|e| CoreError::parse(path, &e))
}

fn parse_intervals_csv(path: &Path, columns: &IntervalColumns) -> anyhow::Result<Vec<DepthInterval>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let position = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let from_idx = position(&columns.from)
        .with_context(|| format!("CSV missing '{}' column", columns.from))?;
    let to_idx =
        position(&columns.to).with_context(|| format!("CSV missing '{}' column", columns.to))?;
    let thickness_idx = position(&columns.thickness);

    let number = |s: Option<&str>| {
        s.and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    };

    let mut intervals = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("CSV row {row}"))?;
        let mut codes = BTreeMap::new();
        for (idx, value) in record.iter().enumerate() {
            if idx == from_idx || idx == to_idx || Some(idx) == thickness_idx {
                continue;
            }
            if let Some(name) = headers.get(idx) {
                codes.insert(name.clone(), value.trim().to_string());
            }
        }
        intervals.push(DepthInterval {
            row,
            from_depth: number(record.get(from_idx)),
            to_depth: number(record.get(to_idx)),
            thickness: thickness_idx.and_then(|i| number(record.get(i))),
            codes,
        });
    }
    Ok(intervals)
}
