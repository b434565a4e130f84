//! Error types for the backend worker
//!
//! Uses thiserror for ergonomic error definitions.
//! Converts into `worker::Error` so route handlers can use `?`.

use thiserror::Error;

/// Custom Result type using our Error
pub type Result<T> = std::result::Result<T, BackendError>;

/// Backend worker errors
#[derive(Error, Debug)]
pub enum BackendError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// KV storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Worker runtime errors
    #[error("Worker error: {0}")]
    Worker(String),
}

impl From<worker::Error> for BackendError {
    fn from(err: worker::Error) -> Self {
        BackendError::Worker(err.to_string())
    }
}

impl From<BackendError> for worker::Error {
    fn from(err: BackendError) -> Self {
        worker::Error::RustError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BackendError::Storage("namespace STATE not bound".to_string());
        assert!(err.to_string().contains("Storage error"));
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: BackendError = json_err.into();
        assert!(matches!(err, BackendError::Json(_)));

        let worker_err: worker::Error = err.into();
        assert!(worker_err.to_string().contains("JSON error"));
    }

    #[test]
    fn test_worker_error_is_wrapped() {
        let err: BackendError = worker::Error::RustError("binding missing".to_string()).into();
        assert!(matches!(err, BackendError::Worker(ref msg) if msg.contains("binding missing")));
    }
}
