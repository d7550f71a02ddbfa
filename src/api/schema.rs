//! Payload types of the electoral API.
//!
//! Unknown fields are ignored and missing collections default to empty, so
//! older and newer backends decode into the same types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the municipality list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MunicipalitySummary {
    pub id: u64,
    pub nombre: String,
}

/// `GET /api/municipios`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MunicipalityList {
    #[serde(default, alias = "municipalities", alias = "municipios")]
    pub items: Vec<MunicipalitySummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// `GET /api/municipios/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MunicipalityEnvelope {
    #[serde(alias = "municipio")]
    pub item: MunicipalityDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MunicipalityDetail {
    pub id: u64,
    pub nombre: String,
    #[serde(default)]
    pub alianzas: Vec<Alliance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alliance {
    #[serde(default)]
    pub id: Option<u64>,
    pub nombre: String,
    #[serde(default)]
    pub candidatos: Candidates,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Candidates {
    #[serde(default)]
    pub intendente: Option<Candidate>,
    #[serde(default)]
    pub viceintendente: Option<Candidate>,
    #[serde(default)]
    pub concejales_titulares: Vec<Candidate>,
    #[serde(default)]
    pub concejales_suplentes: Vec<Candidate>,
}

impl Candidates {
    /// Every listed candidate, heads of ticket included.
    pub fn count(&self) -> u32 {
        let heads = self.intendente.is_some() as usize + self.viceintendente.is_some() as usize;
        (heads + self.concejales_titulares.len() + self.concejales_suplentes.len()) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub id: Option<u64>,
    pub nombre: String,
    #[serde(default)]
    pub dni: Option<String>,
    #[serde(default)]
    pub orden: Option<u32>,
}

/// `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self.status.as_str(), "ok" | "healthy")
    }
}
