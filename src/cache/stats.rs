use serde::Serialize;

use super::store::RangeCache;

/// Summary of the valid (numeric, non-missing) samples of one curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurveStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation (n - 1); zero for a single value.
    pub std: f64,
    pub count: usize,
}

impl CurveStatistics {
    /// `None` when no value survives the missing-value filter.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let valid: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        let count = valid.len();
        if count == 0 {
            return None;
        }

        let min = valid.iter().copied().fold(f64::INFINITY, f64::min);
        let max = valid.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = valid.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let ss: f64 = valid.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            0.0
        };

        Some(Self {
            min,
            max,
            mean,
            std,
            count,
        })
    }
}

/// Cache occupancy and telemetry snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MemoryStats {
    pub cache_size: usize,
    pub size_limit: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub disk_reads: u64,
    pub evictions: u64,
    pub entry_count: usize,
}

impl MemoryStats {
    pub fn of(cache: &RangeCache) -> Self {
        let stats = cache.stats();
        Self {
            cache_size: cache.current_size(),
            size_limit: cache.size_limit(),
            hits: stats.hits,
            misses: stats.misses,
            hit_rate: stats.hit_rate(),
            disk_reads: stats.disk_reads,
            evictions: stats.evictions,
            entry_count: cache.len(),
        }
    }
}
