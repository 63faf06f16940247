//! Error types for configuration and the command-line tools

use std::io;
use thiserror::Error;

/// Crate error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON (configuration or snapshot)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A terminal needs at least one column and one row
    #[error("Invalid terminal size: {cols}x{rows}")]
    InvalidSize { cols: usize, rows: usize },
}

/// Result type for fallible operations
pub type Result<T> = std::result::Result<T, Error>;
