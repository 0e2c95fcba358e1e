//! Error types for highscore-core

use thiserror::Error;

/// Main error type for the highscore-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Backup document error
    #[error("backup error: {message}")]
    Backup { message: String },
}

/// Result type alias for highscore-core
pub type Result<T> = std::result::Result<T, Error>;
