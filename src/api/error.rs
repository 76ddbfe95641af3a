//! Error types for the Pet Store client.

use thiserror::Error;

/// Errors that can occur when talking to the remote Pet Store.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection error (network failure, DNS resolution, timeout).
    #[error("connection error: {0}")]
    Connection(String),

    /// Non-2xx HTTP response.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, best-effort.
        message: String,
    },

    /// Response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Returns `true` if retrying the same request may succeed.
    ///
    /// Connection failures and 5xx responses are retryable; 4xx responses
    /// and decode failures are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Decode(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_errors_are_retryable() {
        assert!(ApiError::Connection("timeout".to_string()).is_retryable());
    }

    #[test]
    fn server_errors_are_retryable() {
        let err = ApiError::Status {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn client_errors_are_not_retryable() {
        let not_found = ApiError::Status {
            status: 404,
            message: "no such pet".to_string(),
        };
        assert!(!not_found.is_retryable());
        assert!(!ApiError::Decode("bad json".to_string()).is_retryable());
    }
}
