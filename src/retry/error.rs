use thiserror::Error;

use crate::transport::TransportError;

/// Final outcome of a logical fetch that did not succeed.
///
/// This is the only error type the view layer ever sees; raw transport
/// errors only travel inside [`FetchError::ExhaustedRetries`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// 404: the resource does not exist. Never retried.
    #[error("Resource not found: {url}")]
    NotFound { url: String },

    /// Any other 4xx. Never retried.
    #[error("Client error {status} for {url}")]
    ClientError { status: u16, url: String },

    /// A non-success status outside the retryable set that is not a 4xx.
    #[error("Unexpected status {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// Every attempt failed with a retryable error; carries the last one.
    #[error("Gave up after {attempts} attempts: {last}")]
    ExhaustedRetries { attempts: u32, last: TransportError },

    /// The caller cancelled the fetch.
    #[error("Request cancelled")]
    Cancelled,

    /// The body did not match the expected schema.
    #[error("Invalid response payload: {message}")]
    Decode { message: String },

    /// The descriptor could not be resolved into a request.
    #[error("Invalid request: {0}")]
    InvalidRequest(TransportError),
}

impl FetchError {
    /// Get error type string for structured logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            FetchError::NotFound { .. } => "not_found",
            FetchError::ClientError { .. } => "client_error",
            FetchError::UnexpectedStatus { .. } => "unexpected_status",
            FetchError::ExhaustedRetries { .. } => "exhausted_retries",
            FetchError::Cancelled => "cancelled",
            FetchError::Decode { .. } => "decode_error",
            FetchError::InvalidRequest(_) => "invalid_request",
        }
    }

    /// True when retries ran out because the last attempt timed out.
    pub fn is_timeout_exhaustion(&self) -> bool {
        matches!(
            self,
            FetchError::ExhaustedRetries {
                last: TransportError::Timeout { .. },
                ..
            }
        )
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode {
            message: err.to_string(),
        }
    }
}
