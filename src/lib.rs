//! Depth-indexed curve cache and interval validator for well-log data.
//!
//! ```text
//!   open(path) ──▶ Dataset ──get_data_range──▶ RangeCache ──miss──▶ reader
//!                                                   │
//!                                                   └─hit──▶ table copy
//!
//!   intervals ──validate_intervals / validate_dictionary_codes──▶ issues
//! ```
//!
//! The core is synchronous and single-threaded. Callers that share a
//! dataset between threads wrap it in [`SharedDataset`].

pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod validate;

use std::collections::BTreeMap;
use std::path::Path;

pub use cache::dataset::{Dataset, DatasetState, SharedDataset, DEFAULT_DEPTH_RANGE};
pub use cache::range_loader::DepthRange;
pub use cache::stats::{CurveStatistics, MemoryStats};
pub use config::{AppConfig, CacheConfig, ValidatorConfig};
pub use data::model::{CellValue, Column, LogTable};
pub use error::CoreError;
pub use validate::dictionary::{CodeLookup, InMemoryCodeLookup};
pub use validate::interval::{DepthInterval, IntervalColumns, Validator};
pub use validate::issue::{Severity, ValidationIssue, ValidationResult};

/// Open a log file; unreadable files come back degraded, not as errors.
pub fn open(path: impl AsRef<Path>) -> Dataset {
    Dataset::open(path)
}

pub fn get_data_range(
    dataset: &mut Dataset,
    range: (f64, f64),
    columns: Option<&[&str]>,
) -> LogTable {
    dataset.data_range(range, columns)
}

/// `(0.0, 1000.0)` when the dataset has no depth index.
pub fn get_depth_range(dataset: &Dataset) -> (f64, f64) {
    dataset.depth_range()
}

pub fn get_curve_names(dataset: &Dataset) -> Vec<String> {
    dataset.curve_names()
}

pub fn get_curve_statistics(dataset: &mut Dataset, name: &str) -> Option<CurveStatistics> {
    dataset.curve_statistics(name)
}

pub fn get_memory_statistics(dataset: &Dataset) -> MemoryStats {
    dataset.memory_statistics()
}

pub fn clear_cache(dataset: &mut Dataset) {
    dataset.clear_cache()
}

pub fn close(dataset: &mut Dataset) {
    dataset.close()
}

pub fn validate_intervals(intervals: &[DepthInterval], total_depth: Option<f64>) -> ValidationResult {
    validate::interval::validate_intervals(intervals, total_depth)
}

pub fn validate_dictionary_codes(
    intervals: &[DepthInterval],
    code_lookup: &dyn CodeLookup,
    column_map: &BTreeMap<String, String>,
) -> ValidationResult {
    validate::dictionary::validate_dictionary_codes(intervals, code_lookup, column_map)
}
