//! Error types for sp-output.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when persisting responses.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{path} has header {found:?}, expected {expected:?}")]
    HeaderMismatch {
        path:     PathBuf,
        expected: Vec<String>,
        found:    Vec<String>,
    },

    #[error("no responses recorded yet")]
    NoData,

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
