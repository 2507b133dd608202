use std::collections::BTreeSet;
use std::path::Path;

use super::depth_index::identify_depth_column;
use crate::data::filter::{apply_mask, depth_mask, project};
use crate::data::loader::LogReader;
use crate::data::model::LogTable;
use crate::error::{CoreError, Result};

/// Closed depth interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthRange {
    pub min: f64,
    pub max: f64,
}

impl DepthRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl From<(f64, f64)> for DepthRange {
    fn from((min, max): (f64, f64)) -> Self {
        Self { min, max }
    }
}

/// Pull the rows of `range` for `columns` (all curves when `None`) out of
/// the source. Re-reads and re-parses the whole file on every call.
pub fn load_range(
    reader: &dyn LogReader,
    path: &Path,
    range: DepthRange,
    columns: Option<&BTreeSet<String>>,
) -> Result<LogTable> {
    let table = reader.read(path)?;
    let depth_column = identify_depth_column(&table.column_names(), table.index_name())
        .ok_or(CoreError::NoDepthColumn)?;
    let depths = table
        .numeric_values(&depth_column)
        .ok_or(CoreError::NoDepthColumn)?;

    let mask = depth_mask(&depths, range.min, range.max);
    let filtered = apply_mask(&table, &mask);
    log::debug!(
        "loaded {} of {} rows for [{}, {}] from {}",
        filtered.num_rows(),
        table.num_rows(),
        range.min,
        range.max,
        path.display()
    );
    project(filtered, &depth_column, columns)
}
