//! Fetch results as published to the store.

use serde::{Deserialize, Serialize};

use crate::api::{ElectoralApi, MunicipalityDetail, MunicipalityList};
use crate::cancel::CancelSignal;
use crate::retry::FetchError;
use crate::transport::Transport;
use crate::ui::dashboard::{Failure, Operation};

/// Written under [`keys::FETCH_OUTCOME`](crate::store::keys::FETCH_OUTCOME)
/// by every fetch task when it resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchOutcome {
    /// Controller that started the fetch. Others sharing the store ignore it.
    pub source: String,
    /// Identifies the fetch; only the latest one is applied.
    pub generation: u64,
    pub operation: Operation,
    pub result: OutcomeResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeResult {
    List { list: MunicipalityList },
    Detail { detail: MunicipalityDetail },
    Failed { failure: Failure },
    Cancelled,
}

/// Run `operation` to completion and classify the result.
pub(crate) async fn run_operation<T: Transport>(
    api: &ElectoralApi<T>,
    operation: Operation,
    cancel: &CancelSignal,
) -> OutcomeResult {
    let result = match operation {
        Operation::LoadList => api
            .list_municipalities(cancel)
            .await
            .map(|list| OutcomeResult::List { list }),
        Operation::LoadDetail { id } => api
            .municipality_detail(id, cancel)
            .await
            .map(|detail| OutcomeResult::Detail { detail }),
    };

    match result {
        Ok(result) => result,
        Err(FetchError::Cancelled) => OutcomeResult::Cancelled,
        Err(e) => {
            tracing::warn!(
                error = %e,
                error_type = e.error_type(),
                operation = ?operation,
                "Fetch failed"
            );
            OutcomeResult::Failed {
                failure: Failure::from_fetch(&e, operation),
            }
        }
    }
}
