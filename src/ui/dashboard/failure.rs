use serde::{Deserialize, Serialize};

use crate::retry::FetchError;

pub const TIMEOUT_MESSAGE: &str = "Tiempo de espera agotado. Intenta nuevamente.";
pub const NETWORK_MESSAGE: &str = "Error de conexión con el servidor.";
pub const NOT_FOUND_MESSAGE: &str = "No se encontraron datos para el municipio seleccionado.";
pub const DEFAULT_MESSAGE: &str = "Ha ocurrido un error inesperado.";

/// A fetch the dashboard can (re)issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    LoadList,
    LoadDetail { id: u64 },
}

impl Operation {
    pub fn loading_message(&self) -> &'static str {
        match self {
            Operation::LoadList => "Cargando municipios...",
            Operation::LoadDetail { .. } => "Cargando datos del municipio...",
        }
    }
}

/// What the error view offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Recovery {
    Retry { operation: Operation },
    GoBack,
}

/// User-facing failure shown by the error view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub message: String,
    pub recovery: Recovery,
    /// `error_type()` of the underlying fetch error, for logs.
    pub cause: String,
}

impl Failure {
    pub fn from_fetch(error: &FetchError, operation: Operation) -> Self {
        let retry = Recovery::Retry { operation };
        let (message, recovery) = match error {
            // A missing list endpoint is a server problem, not a bad selection
            FetchError::NotFound { .. } if operation == Operation::LoadList => {
                (NETWORK_MESSAGE, retry)
            }
            FetchError::NotFound { .. } => (NOT_FOUND_MESSAGE, Recovery::GoBack),
            FetchError::ExhaustedRetries { .. } if error.is_timeout_exhaustion() => {
                (TIMEOUT_MESSAGE, retry)
            }
            FetchError::ExhaustedRetries { .. } => (NETWORK_MESSAGE, retry),
            FetchError::UnexpectedStatus { status, .. } if *status >= 500 => {
                (NETWORK_MESSAGE, retry)
            }
            FetchError::Cancelled => (DEFAULT_MESSAGE, retry),
            FetchError::ClientError { .. }
            | FetchError::UnexpectedStatus { .. }
            | FetchError::Decode { .. }
            | FetchError::InvalidRequest(_) => (DEFAULT_MESSAGE, Recovery::GoBack),
        };

        Self {
            message: message.to_string(),
            recovery,
            cause: error.error_type().to_string(),
        }
    }

    pub fn can_retry(&self) -> bool {
        matches!(self.recovery, Recovery::Retry { .. })
    }
}
