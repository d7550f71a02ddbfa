//! Single-attempt HTTP transport.
//!
//! A transport performs exactly one call, races it against the request
//! timeout and the caller's cancel signal, and classifies the outcome.
//! Retry policy lives in [`crate::retry`].

mod error;
mod http;
mod request;

use async_trait::async_trait;

use crate::cancel::CancelSignal;

pub use error::TransportError;
pub use http::HttpTransport;
pub use request::{RawResponse, RequestDescriptor, ResolvedRequest};

/// One network call, one outcome.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue `request` once.
    ///
    /// Non-success statuses come back as [`TransportError::HttpStatus`],
    /// never as a panic.
    async fn send(
        &self,
        request: &ResolvedRequest,
        cancel: &CancelSignal,
    ) -> Result<RawResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(
        &self,
        request: &ResolvedRequest,
        cancel: &CancelSignal,
    ) -> Result<RawResponse, TransportError> {
        (**self).send(request, cancel).await
    }
}
