//! Outcome classification for a single HTTP attempt.

use std::time::Duration;

use thiserror::Error;

/// Errors a single transport attempt can produce.
///
/// Values are cheap to clone so the retry coordinator can keep the last
/// observed error around after the attempt that produced it is gone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// DNS, connection refused, reset, or failure while reading the body
    #[error("Network failure: {message}")]
    NetworkFailure { message: String },

    /// The attempt did not complete within its timeout
    #[error("Request timed out after {}ms", .timeout.as_millis())]
    Timeout { timeout: Duration },

    /// The server answered with a non-success status
    #[error("HTTP {status}")]
    HttpStatus { status: u16, body: String },

    /// The caller cancelled the attempt
    #[error("Request cancelled")]
    Cancelled,

    /// The request could not be turned into a valid URL
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl TransportError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 5xx-class response.
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(s) if (500..600).contains(&s))
    }

    /// 4xx-class response.
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(s) if (400..500).contains(&s))
    }

    /// Get error type string for structured logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            TransportError::NetworkFailure { .. } => "network_failure",
            TransportError::Timeout { .. } => "timeout",
            TransportError::HttpStatus { .. } if self.is_server_error() => "server_error",
            TransportError::HttpStatus { .. } if self.is_client_error() => "client_error",
            TransportError::HttpStatus { .. } => "http_status",
            TransportError::Cancelled => "cancelled",
            TransportError::InvalidUrl { .. } => "invalid_url",
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::NetworkFailure {
            message: err.to_string(),
        }
    }
}
