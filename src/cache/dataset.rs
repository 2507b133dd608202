use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::depth_index::{identify_depth_column, DepthIndex};
use super::range_loader::{load_range, DepthRange};
use super::stats::{CurveStatistics, MemoryStats};
use super::store::{CacheKey, RangeCache};
use crate::config::CacheConfig;
use crate::data::loader::{FileReader, LogReader};
use crate::data::model::LogTable;
use crate::error::{CoreError, Result};

/// Reported when the index is empty.
pub const DEFAULT_DEPTH_RANGE: (f64, f64) = (0.0, 1000.0);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetState {
    Ready,
    /// Unreadable source or no depth axis; queries return defaults.
    Degraded { reason: String },
    Closed,
}

// ---------------------------------------------------------------------------
// Dataset – one opened log file and its range cache
// ---------------------------------------------------------------------------

/// Handle to one source file. The depth index and curve list are built
/// once at open; range queries go through the owned [`RangeCache`].
///
/// Not synchronised: wrap in [`SharedDataset`] to use from several threads.
pub struct Dataset {
    path: PathBuf,
    reader: Arc<dyn LogReader>,
    state: DatasetState,
    depth_column: Option<String>,
    curve_names: Vec<String>,
    depth_index: DepthIndex,
    file_size: u64,
    cache: RangeCache,
}

impl std::fmt::Debug for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset")
            .field("path", &self.path)
            .field("state", &self.state)
            .field("depth_column", &self.depth_column)
            .field("curves", &self.curve_names.len())
            .field("rows", &self.depth_index.len())
            .finish()
    }
}

impl Dataset {
    /// Open a file from disk. Never fails: an unreadable file or one with
    /// no depth column yields a [`DatasetState::Degraded`] dataset.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::open_with(path, Arc::new(FileReader), CacheConfig::default())
    }

    pub fn open_with(
        path: impl AsRef<Path>,
        reader: Arc<dyn LogReader>,
        config: CacheConfig,
    ) -> Self {
        let path = path.as_ref();
        match Self::try_open_with(path, Arc::clone(&reader), config.clone()) {
            Ok(dataset) => dataset,
            Err(err) => {
                log::warn!("opening {} degraded: {err}", path.display());
                Self {
                    path: path.to_path_buf(),
                    reader,
                    state: DatasetState::Degraded {
                        reason: err.to_string(),
                    },
                    depth_column: None,
                    curve_names: Vec::new(),
                    depth_index: DepthIndex::default(),
                    file_size: file_size(path),
                    cache: RangeCache::new(config),
                }
            }
        }
    }

    /// Like [`Dataset::open`], but reports why the file is unusable.
    pub fn try_open(path: impl AsRef<Path>) -> Result<Self> {
        Self::try_open_with(path, Arc::new(FileReader), CacheConfig::default())
    }

    pub fn try_open_with(
        path: impl AsRef<Path>,
        reader: Arc<dyn LogReader>,
        config: CacheConfig,
    ) -> Result<Self> {
        let path = path.as_ref();
        let table = reader.read(path)?;
        let depth_column = identify_depth_column(&table.column_names(), table.index_name())
            .ok_or(CoreError::NoDepthColumn)?;
        let depths = table
            .numeric_values(&depth_column)
            .ok_or(CoreError::NoDepthColumn)?;
        let depth_index = DepthIndex::build(depths);
        let curve_names: Vec<String> = table
            .column_names()
            .into_iter()
            .filter(|name| *name != depth_column)
            .collect();

        log::info!(
            "opened {}: depth column {depth_column}, {} curves, {} depth samples",
            path.display(),
            curve_names.len(),
            depth_index.len()
        );
        Ok(Self {
            path: path.to_path_buf(),
            reader,
            state: DatasetState::Ready,
            depth_column: Some(depth_column),
            curve_names,
            depth_index,
            file_size: file_size(path),
            cache: RangeCache::new(config),
        })
    }

    // -- accessors --

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &DatasetState {
        &self.state
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.state, DatasetState::Degraded { .. })
    }

    pub fn depth_column(&self) -> Option<&str> {
        self.depth_column.as_deref()
    }

    pub fn depth_index(&self) -> &DepthIndex {
        &self.depth_index
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn row_count(&self) -> usize {
        self.depth_index.len()
    }

    pub fn depth_step(&self) -> Option<f64> {
        self.depth_index.step()
    }

    pub fn curve_names(&self) -> Vec<String> {
        self.curve_names.clone()
    }

    /// First and last indexed depth, or `(0.0, 1000.0)` with no index.
    pub fn depth_range(&self) -> (f64, f64) {
        self.depth_index.bounds().unwrap_or(DEFAULT_DEPTH_RANGE)
    }

    // -- range queries --

    /// Rows with `min <= depth <= max` for `columns` (all curves when
    /// `None`), depth column first. Any failure yields an empty table.
    pub fn data_range(&mut self, range: impl Into<DepthRange>, columns: Option<&[&str]>) -> LogTable {
        let range = range.into();
        self.try_data_range(range, columns).unwrap_or_else(|err| {
            log::warn!(
                "range [{}, {}] of {} unavailable: {err}",
                range.min,
                range.max,
                self.path.display()
            );
            LogTable::empty()
        })
    }

    pub fn try_data_range(
        &mut self,
        range: impl Into<DepthRange>,
        columns: Option<&[&str]>,
    ) -> Result<LogTable> {
        match &self.state {
            DatasetState::Closed => return Err(CoreError::Closed),
            DatasetState::Degraded { reason } => return Err(CoreError::Degraded(reason.clone())),
            DatasetState::Ready => {}
        }
        let range = range.into();
        let columns: Option<BTreeSet<String>> =
            columns.map(|cols| cols.iter().map(|c| c.to_string()).collect());
        let key = CacheKey::new(range, columns.clone());

        let reader = Arc::clone(&self.reader);
        let path = self.path.clone();
        self.cache
            .get_or_load(key, || load_range(reader.as_ref(), &path, range, columns.as_ref()))
    }

    /// Summary statistics of one curve over the whole indexed depth range.
    pub fn curve_statistics(&mut self, name: &str) -> Option<CurveStatistics> {
        let known = self.curve_names.iter().any(|c| c == name)
            || self.depth_column.as_deref() == Some(name);
        if !known {
            return None;
        }
        let range = self.depth_index.bounds()?;
        let table = self.data_range(range, Some(&[name]));
        CurveStatistics::from_values(table.numeric_values(name)?)
    }

    pub fn memory_statistics(&self) -> MemoryStats {
        MemoryStats::of(&self.cache)
    }

    /// Drop every cached range and reset the telemetry.
    pub fn clear_cache(&mut self) {
        log::info!(
            "clearing {} cached ranges for {}",
            self.cache.len(),
            self.path.display()
        );
        self.cache.clear();
    }

    /// Release the cache; later queries return defaults.
    pub fn close(&mut self) {
        self.cache.clear();
        self.depth_index = DepthIndex::default();
        self.curve_names.clear();
        self.depth_column = None;
        self.state = DatasetState::Closed;
        log::info!("closed {}", self.path.display());
    }
}

fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

// ---------------------------------------------------------------------------
// SharedDataset – single-writer lock around a Dataset
// ---------------------------------------------------------------------------

/// Cloneable handle serialising access to one [`Dataset`] across threads.
#[derive(Debug, Clone)]
pub struct SharedDataset {
    inner: Arc<Mutex<Dataset>>,
}

impl SharedDataset {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            inner: Arc::new(Mutex::new(dataset)),
        }
    }

    /// Exclusive access for a sequence of calls.
    pub fn lock(&self) -> MutexGuard<'_, Dataset> {
        // A panic in another caller leaves the cache consistent: every
        // mutation completes before control returns.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn data_range(&self, range: impl Into<DepthRange>, columns: Option<&[&str]>) -> LogTable {
        self.lock().data_range(range, columns)
    }

    pub fn depth_range(&self) -> (f64, f64) {
        self.lock().depth_range()
    }

    pub fn curve_names(&self) -> Vec<String> {
        self.lock().curve_names()
    }

    pub fn curve_statistics(&self, name: &str) -> Option<CurveStatistics> {
        self.lock().curve_statistics(name)
    }

    pub fn memory_statistics(&self) -> MemoryStats {
        self.lock().memory_statistics()
    }

    pub fn clear_cache(&self) {
        self.lock().clear_cache()
    }

    pub fn close(&self) {
        self.lock().close()
    }
}
