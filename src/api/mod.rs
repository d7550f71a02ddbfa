//! Typed client for the electoral API.

mod schema;
mod summary;

use std::time::Duration;

pub use schema::{
    Alliance, Candidate, Candidates, HealthStatus, MunicipalityDetail, MunicipalityEnvelope,
    MunicipalityList, MunicipalitySummary,
};
pub use summary::{AllianceTally, ResultsSummary};

use crate::cancel::CancelSignal;
use crate::config::Config;
use crate::retry::{ApiStats, FetchError, RetryCoordinator};
use crate::transport::{RequestDescriptor, Transport};

/// Endpoint paths plus the per-request budget copied into every descriptor.
#[derive(Debug, Clone, PartialEq)]
struct Endpoints {
    list: String,
    detail: String,
    health: String,
    timeout: Duration,
    max_attempts: u32,
    base_backoff: Duration,
}

/// The three calls the dashboard makes, over a [`RetryCoordinator`].
pub struct ElectoralApi<T: Transport> {
    coordinator: RetryCoordinator<T>,
    endpoints: Endpoints,
}

impl<T: Transport> ElectoralApi<T> {
    pub fn new(transport: T, config: &Config) -> Self {
        Self::with_coordinator(RetryCoordinator::from_config(transport, config), config)
    }

    pub fn with_coordinator(coordinator: RetryCoordinator<T>, config: &Config) -> Self {
        Self {
            coordinator,
            endpoints: Endpoints {
                list: config.api.list_endpoint.clone(),
                detail: config.api.detail_endpoint.clone(),
                health: config.api.health_endpoint.clone(),
                timeout: Duration::from_millis(config.api.timeout_ms),
                max_attempts: config.retry.max_attempts,
                base_backoff: Duration::from_millis(config.retry.base_backoff_ms),
            },
        }
    }

    pub fn coordinator(&self) -> &RetryCoordinator<T> {
        &self.coordinator
    }

    pub fn stats(&self) -> ApiStats {
        self.coordinator.stats()
    }

    fn descriptor(&self, template: &str) -> RequestDescriptor {
        RequestDescriptor::get(template)
            .timeout(self.endpoints.timeout)
            .max_attempts(self.endpoints.max_attempts)
            .base_backoff(self.endpoints.base_backoff)
    }

    pub async fn list_municipalities(
        &self,
        cancel: &CancelSignal,
    ) -> Result<MunicipalityList, FetchError> {
        let descriptor = self.descriptor(&self.endpoints.list);
        let list: MunicipalityList = self.coordinator.fetch_json(&descriptor, cancel).await?;
        tracing::info!(count = list.items.len(), "Municipalities loaded");
        Ok(list)
    }

    pub async fn municipality_detail(
        &self,
        id: u64,
        cancel: &CancelSignal,
    ) -> Result<MunicipalityDetail, FetchError> {
        let descriptor = self.descriptor(&self.endpoints.detail).param("id", id);
        let envelope: MunicipalityEnvelope =
            self.coordinator.fetch_json(&descriptor, cancel).await?;
        tracing::info!(id, nombre = %envelope.item.nombre, "Municipality detail loaded");
        Ok(envelope.item)
    }

    pub async fn health_check(&self, cancel: &CancelSignal) -> Result<HealthStatus, FetchError> {
        let descriptor = self.descriptor(&self.endpoints.health);
        match self.coordinator.fetch_json::<HealthStatus>(&descriptor, cancel).await {
            Ok(health) => {
                tracing::info!(status = %health.status, version = ?health.version, "API health check successful");
                Ok(health)
            }
            Err(e) => {
                tracing::warn!(error = %e, "API health check failed");
                Err(e)
            }
        }
    }
}
