//! Depth axis detection and the sorted, de-duplicated depth index.

/// Substrings that mark a column as the depth axis, checked case-insensitively.
pub const DEPTH_PATTERNS: [&str; 3] = ["DEPT", "DEPTH", "MD"];

/// Find the depth column by name.
///
/// Column names are checked first, in order, and the first match wins.
/// If none match, the table's row-index name is tried. `None` means the
/// dataset has no depth semantics; callers treat that as "no data", not as
/// a failure.
pub fn identify_depth_column(columns: &[String], index_name: Option<&str>) -> Option<String> {
    columns
        .iter()
        .map(String::as_str)
        .chain(index_name)
        .find(|name| is_depth_like(name))
        .map(str::to_string)
}

fn is_depth_like(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    DEPTH_PATTERNS.iter().any(|p| upper.contains(p))
}

/// Strictly increasing depth values with no duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DepthIndex {
    depths: Vec<f64>,
}

impl DepthIndex {
    /// Sort ascending and drop exact duplicates. Missing (NaN) samples are
    /// skipped; no interpolation or gap filling is done.
    pub fn build(values: impl IntoIterator<Item = f64>) -> Self {
        let mut depths: Vec<f64> = values.into_iter().filter(|d| !d.is_nan()).collect();
        depths.sort_by(f64::total_cmp);
        depths.dedup();
        Self { depths }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.depths
    }

    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// `(first, last)` depth, or `None` for an empty index.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        Some((*self.depths.first()?, *self.depths.last()?))
    }

    /// Median spacing between consecutive samples.
    pub fn step(&self) -> Option<f64> {
        let mut steps: Vec<f64> = self.depths.windows(2).map(|w| w[1] - w[0]).collect();
        if steps.is_empty() {
            return None;
        }
        steps.sort_by(f64::total_cmp);
        Some(steps[steps.len() / 2])
    }
}
