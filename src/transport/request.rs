//! Request descriptors and their resolved form.

use std::time::Duration;

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::transport::error::TransportError;

/// Everything needed to issue one logical request, including its retry budget.
///
/// Built once per call site with the chained constructors below and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: Method,
    url_template: String,
    params: Vec<(String, String)>,
    body: Option<Value>,
    timeout: Duration,
    max_attempts: u32,
    base_backoff: Duration,
}

impl RequestDescriptor {
    pub fn new(method: Method, url_template: impl Into<String>) -> Self {
        Self {
            method,
            url_template: url_template.into(),
            params: Vec::new(),
            body: None,
            timeout: Duration::from_secs(10),
            max_attempts: 3,
            base_backoff: Duration::from_millis(1000),
        }
    }

    pub fn get(url_template: impl Into<String>) -> Self {
        Self::new(Method::GET, url_template)
    }

    /// Bind a `{name}` placeholder of the URL template.
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Retries allowed after the first attempt.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn base_backoff(mut self, base_backoff: Duration) -> Self {
        self.base_backoff = base_backoff;
        self
    }

    pub fn backoff_base(&self) -> Duration {
        self.base_backoff
    }

    /// Total attempts the coordinator may make: the first plus every retry.
    pub fn total_attempts(&self) -> u32 {
        self.max_attempts.saturating_add(1)
    }

    /// Substitute the template placeholders and join with `base_url`.
    ///
    /// Absolute templates (`http://...`) ignore the base URL. Any placeholder
    /// left unbound is an error.
    pub fn resolve(&self, base_url: &str) -> Result<ResolvedRequest, TransportError> {
        let mut path = self.url_template.clone();
        for (name, value) in &self.params {
            let encoded: String = url::form_urlencoded::byte_serialize(value.as_bytes())
                .collect::<String>()
                .replace('+', "%20");
            path = path.replace(&format!("{{{}}}", name), &encoded);
        }

        if let Some(start) = path.find('{') {
            let placeholder: String = path[start..].chars().take_while(|c| *c != '}').collect();
            return Err(TransportError::InvalidUrl {
                url: path.clone(),
                reason: format!("unbound placeholder {}}}", placeholder),
            });
        }

        let full = if path.starts_with("http://") || path.starts_with("https://") {
            path
        } else {
            format!("{}{}", base_url.trim_end_matches('/'), path)
        };

        let url = Url::parse(&full).map_err(|e| TransportError::InvalidUrl {
            url: full.clone(),
            reason: e.to_string(),
        })?;

        Ok(ResolvedRequest {
            method: self.method.clone(),
            url,
            body: self.body.clone(),
            timeout: self.timeout,
        })
    }
}

/// A request ready to hand to a [`Transport`](crate::transport::Transport).
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Value>,
    pub timeout: Duration,
}

/// Successful response of a single attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub elapsed: Duration,
}

impl RawResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_substitutes_placeholders() {
        let req = RequestDescriptor::get("/api/municipios/{id}")
            .param("id", 42)
            .resolve("http://localhost:5001/")
            .unwrap();
        assert_eq!(req.url.as_str(), "http://localhost:5001/api/municipios/42");
        assert_eq!(req.method, Method::GET);
    }

    #[test]
    fn resolve_encodes_parameter_values() {
        let req = RequestDescriptor::get("/api/buscar/{q}")
            .param("q", "San Luis/Norte")
            .resolve("http://localhost")
            .unwrap();
        assert_eq!(req.url.as_str(), "http://localhost/api/buscar/San%20Luis%2FNorte");
    }

    #[test]
    fn resolve_rejects_unbound_placeholder() {
        let err = RequestDescriptor::get("/api/municipios/{id}")
            .resolve("http://localhost")
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
    }

    #[test]
    fn resolve_keeps_absolute_templates() {
        let req = RequestDescriptor::get("https://other.example/api/health")
            .resolve("http://localhost")
            .unwrap();
        assert_eq!(req.url.as_str(), "https://other.example/api/health");
    }

    #[test]
    fn total_attempts_counts_first_attempt() {
        let desc = RequestDescriptor::get("/x").max_attempts(2);
        assert_eq!(desc.total_attempts(), 3);
    }
}
