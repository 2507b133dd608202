use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Default cache budget: 100 MiB.
pub const DEFAULT_SIZE_LIMIT: usize = 100 * 1024 * 1024;

/// Depth comparisons in the validator use this absolute tolerance.
pub const DEFAULT_TOLERANCE: f64 = 0.001;

// ---------------------------------------------------------------------------
// Cache settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Soft upper bound on the summed estimated size of cached tables.
    pub size_limit_bytes: usize,
    /// Share of entries dropped in one eviction pass (rounded down).
    pub eviction_fraction: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            size_limit_bytes: DEFAULT_SIZE_LIMIT,
            eviction_fraction: 0.25,
        }
    }
}

impl CacheConfig {
    pub fn with_size_limit(size_limit_bytes: usize) -> Self {
        Self {
            size_limit_bytes,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Validator settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub tolerance: f64,
    pub check_duplicates: bool,
    pub check_thickness: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            check_duplicates: true,
            check_thickness: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config file
// ---------------------------------------------------------------------------

/// Settings file layout:
///
/// ```json
/// {
///   "cache": { "size_limit_bytes": 104857600, "eviction_fraction": 0.25 },
///   "validator": { "tolerance": 0.001 }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub cache: CacheConfig,
    pub validator: ValidatorConfig,
}

impl AppConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: AppConfig =
            serde_json::from_str(text).map_err(|e| CoreError::Config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    fn check(&self) -> Result<()> {
        let fraction = self.cache.eviction_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(CoreError::Config(format!(
                "eviction_fraction must be in (0, 1], got {fraction}"
            )));
        }
        if !(self.validator.tolerance >= 0.0) {
            return Err(CoreError::Config(format!(
                "tolerance must be non-negative, got {}",
                self.validator.tolerance
            )));
        }
        Ok(())
    }
}
