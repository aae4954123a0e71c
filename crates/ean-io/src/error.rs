//! Error types for ean-io.

use std::path::PathBuf;

use ean_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot open {path}: {source}")]
    Open {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("table format error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{table}, line {line}: {message}")]
    Parse {
        table:   String,
        line:    u64,
        message: String,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Alias for `Result<T, IoError>`.
pub type IoResult<T> = Result<T, IoError>;
