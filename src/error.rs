//! Error types for dataset, cache and configuration operations.

use std::path::PathBuf;

/// Failures surfaced by the core. Range-dependent convenience operations
/// swallow these into empty results; the `try_*` variants return them.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Source file missing or unreadable.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source file exists but its contents could not be parsed.
    #[error("cannot parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// No reader is registered for this file extension.
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    /// No column or row index looks like a depth axis.
    #[error("no depth column found")]
    NoDepthColumn,

    /// A requested curve is not part of the dataset.
    #[error("unknown curve: {0}")]
    UnknownCurve(String),

    /// The dataset was opened degraded; carries the reason it is unusable.
    #[error("dataset unavailable: {0}")]
    Degraded(String),

    /// The dataset has been closed.
    #[error("dataset is closed")]
    Closed,

    /// Invalid or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Wrap an `anyhow` chain from a file reader into a parse error.
    pub fn parse(path: impl Into<PathBuf>, err: &anyhow::Error) -> Self {
        CoreError::Parse {
            path: path.into(),
            message: format!("{err:#}"),
        }
    }
}
