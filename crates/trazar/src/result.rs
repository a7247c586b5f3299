//! Result and error types for Trazar.

use thiserror::Error;

/// Result type for Trazar operations
pub type TrazarResult<T> = Result<T, TrazarError>;

/// Errors that can occur in Trazar.
///
/// Soft content findings are not errors: the validator folds them into
/// `ValidationMetrics::errors` and `TestResult::issues` instead of raising.
#[derive(Debug, Error)]
pub enum TrazarError {
    /// Connection to the service could not be established (DNS failure,
    /// connection refused, request aborted before any status existed).
    /// Fatal to the single call, not to the run.
    #[error("Transport error: {message}")]
    Transport {
        /// Error message
        message: String,
    },

    /// Login did not yield a usable bearer token.
    #[error("Authentication failed: {message}")]
    Auth {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TrazarError {
    /// Create a transport error
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create an authentication error
    #[must_use]
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error() {
        let err = TrazarError::transport("connection refused");
        assert!(err.to_string().contains("Transport"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_auth_error() {
        let err = TrazarError::auth("no token in response");
        assert!(err.to_string().contains("Authentication"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TrazarError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }

    #[test]
    fn test_json_error_from() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: TrazarError = json_err.into();
        assert!(err.to_string().contains("JSON"));
    }
}
