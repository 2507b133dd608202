use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::Context;

use super::interval::DepthInterval;
use super::issue::{ValidationIssue, ValidationResult};
use crate::error::{CoreError, Result};

/// Source of valid codes per category (lithology, colour, ...). Passed in
/// explicitly; there is no process-wide dictionary.
pub trait CodeLookup {
    fn is_loaded(&self) -> bool;

    /// `(code, description)` pairs; empty for an unknown category.
    fn codes_for_category(&self, category: &str) -> Vec<(String, String)>;
}

/// Code table held in memory, keyed by category.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCodeLookup {
    categories: BTreeMap<String, Vec<(String, String)>>,
    loaded: bool,
}

impl InMemoryCodeLookup {
    /// An empty lookup that reports itself loaded.
    pub fn new() -> Self {
        Self {
            categories: BTreeMap::new(),
            loaded: true,
        }
    }

    /// A lookup that reports itself unloaded.
    pub fn unloaded() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        category: impl Into<String>,
        code: impl Into<String>,
        description: impl Into<String>,
    ) {
        self.categories
            .entry(category.into())
            .or_default()
            .push((code.into(), description.into()));
    }

    pub fn with_code(
        mut self,
        category: impl Into<String>,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.insert(category, code, description);
        self
    }

    /// CSV with a `category,code,description` header.
    pub fn from_csv(path: &Path) -> Result<Self> {
        std::fs::metadata(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_csv(path).map_err(|e| CoreError::parse(path, &e))
    }

    fn parse_csv(path: &Path) -> anyhow::Result<Self> {
        let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
        let mut lookup = Self::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("CSV row {row}"))?;
            let category = record.get(0).with_context(|| format!("row {row}: missing category"))?;
            let code = record.get(1).with_context(|| format!("row {row}: missing code"))?;
            let description = record.get(2).unwrap_or("");
            lookup.insert(category.trim(), code.trim(), description.trim());
        }
        Ok(lookup)
    }
}

impl CodeLookup for InMemoryCodeLookup {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn codes_for_category(&self, category: &str) -> Vec<(String, String)> {
        self.categories.get(category).cloned().unwrap_or_default()
    }
}

/// Check each coded column in `column_map` (column name → category) against
/// the lookup. Unknown codes and empty categories are warnings; blank cells
/// are not checked. An unloaded lookup skips the pass with one warning.
pub fn validate_dictionary_codes(
    intervals: &[DepthInterval],
    lookup: &dyn CodeLookup,
    column_map: &BTreeMap<String, String>,
) -> ValidationResult {
    let mut result = ValidationResult::default();
    if !lookup.is_loaded() {
        result.push(ValidationIssue::warning(
            "code dictionary is not loaded; code checks skipped",
        ));
        return result;
    }

    for (column, category) in column_map {
        let known: BTreeSet<String> = lookup
            .codes_for_category(category)
            .into_iter()
            .map(|(code, _)| code)
            .collect();
        if known.is_empty() {
            result.push(
                ValidationIssue::warning(format!("no codes defined for category {category}"))
                    .in_column(column.clone()),
            );
            continue;
        }

        for interval in intervals {
            let Some(code) = interval.codes.get(column).filter(|c| !c.is_empty()) else {
                continue;
            };
            if !known.contains(code) {
                result.push(
                    ValidationIssue::warning(format!("unknown {category} code {code}"))
                        .at_row(interval.row)
                        .in_column(column.clone())
                        .with_value(code.clone()),
                );
            }
        }
    }
    result
}
