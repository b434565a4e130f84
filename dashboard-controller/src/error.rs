//! Error types for the dashboard controller
//!
//! Uses thiserror for ergonomic error definitions.
//! Handlers log these and carry on; nothing here is fatal to the UI.

use thiserror::Error;

/// Custom Result type using our Error
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Dashboard controller errors
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level HTTP errors (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend answered with a non-success status
    #[error("Backend error: {0}")]
    Backend(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: retry after {0} seconds")]
    RateLimit(u64),

    /// An input field did not hold a usable number
    #[error("Invalid input in {field}: {value:?}")]
    InvalidInput { field: &'static str, value: String },

    /// Terminal I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        DashboardError::Http(err.to_string())
    }
}
