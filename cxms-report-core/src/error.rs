//! Error types for cxms-report-core

use thiserror::Error;

/// Main error type for the cxms-report-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Logging setup error
    #[error("logging error: {0}")]
    Logging(String),

    /// Submission to the collection endpoint failed
    #[error("submission failed: {0}")]
    Submit(String),
}

/// Result type alias for cxms-report-core
pub type Result<T> = std::result::Result<T, Error>;
