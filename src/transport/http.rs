use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tokio::time::timeout;

use crate::cancel::CancelSignal;
use crate::transport::error::TransportError;
use crate::transport::request::{RawResponse, ResolvedRequest};
use crate::transport::Transport;

/// Error bodies are kept for diagnostics only; cap what we hold on to.
const MAX_ERROR_BODY: usize = 512;

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    async fn execute(&self, request: &ResolvedRequest) -> Result<(u16, Vec<u8>), TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .header(ACCEPT, "application/json");

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            // An unreadable error body still reports the status
            let body = response.bytes().await.unwrap_or_default();
            let mut text = String::from_utf8_lossy(&body).into_owned();
            if text.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !text.is_char_boundary(cut) {
                    cut -= 1;
                }
                text.truncate(cut);
            }
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let body = response.bytes().await?;
        Ok((status.as_u16(), body.to_vec()))
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &ResolvedRequest,
        cancel: &CancelSignal,
    ) -> Result<RawResponse, TransportError> {
        if cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }

        let started = Instant::now();

        // Dropping the losing branch drops the in-flight reqwest future, which
        // aborts the connection; the timer is owned by `timeout` and goes with it.
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TransportError::Cancelled),
            result = timeout(request.timeout, self.execute(request)) => match result {
                Ok(inner) => inner,
                Err(_) => Err(TransportError::Timeout {
                    timeout: request.timeout,
                }),
            },
        };

        let elapsed = started.elapsed();
        match outcome {
            Ok((status, body)) => {
                tracing::trace!(
                    method = %request.method,
                    url = %request.url,
                    status,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Transport call succeeded"
                );
                Ok(RawResponse {
                    status,
                    body,
                    elapsed,
                })
            }
            Err(err) => {
                tracing::trace!(
                    method = %request.method,
                    url = %request.url,
                    error_type = err.error_type(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Transport call failed"
                );
                Err(err)
            }
        }
    }
}
