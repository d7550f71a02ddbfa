//! Pure rendering description of a view state.

use std::fmt;

use serde::Serialize;

use crate::api::{MunicipalitySummary, ResultsSummary};
use crate::resource::ChartKind;
use crate::ui::dashboard::{filter_entities, ViewState};

/// What a renderer needs to draw the current view. Contains no live handles.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewDescription {
    Loading {
        message: String,
    },
    Selector {
        query: String,
        total: usize,
        shown: Vec<MunicipalitySummary>,
    },
    Results {
        id: u64,
        nombre: String,
        chart: ChartKind,
        summary: ResultsSummary,
    },
    Error {
        message: String,
        can_retry: bool,
        can_go_back: bool,
    },
}

impl ViewDescription {
    pub fn of(view: &ViewState) -> Self {
        match view {
            ViewState::Loading { message, .. } => ViewDescription::Loading {
                message: message.clone(),
            },
            ViewState::Selector { entities, query } => ViewDescription::Selector {
                query: query.clone(),
                total: entities.len(),
                shown: filter_entities(entities, query).into_iter().cloned().collect(),
            },
            ViewState::Results {
                entity,
                summary,
                chart,
            } => ViewDescription::Results {
                id: entity.id,
                nombre: entity.nombre.clone(),
                chart: *chart,
                summary: summary.clone(),
            },
            ViewState::Error { failure } => ViewDescription::Error {
                message: failure.message.clone(),
                can_retry: failure.can_retry(),
                can_go_back: true,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ViewDescription::Loading { .. } => "loading",
            ViewDescription::Selector { .. } => "selector",
            ViewDescription::Results { .. } => "results",
            ViewDescription::Error { .. } => "error",
        }
    }
}

impl fmt::Display for ViewDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewDescription::Loading { message } => write!(f, "[loading] {}", message),
            ViewDescription::Selector {
                query,
                total,
                shown,
            } => {
                write!(f, "[selector] Mostrando {} de {} municipios", shown.len(), total)?;
                if !query.is_empty() {
                    write!(f, " (búsqueda: \"{}\")", query)?;
                }
                for entity in shown {
                    write!(f, "\n  {:>4}  {}", entity.id, entity.nombre)?;
                }
                Ok(())
            }
            ViewDescription::Results {
                id,
                nombre,
                chart,
                summary,
            } => {
                write!(
                    f,
                    "[results] {} (ID {}) chart={} total={} promedio={}",
                    nombre,
                    id,
                    chart.as_str(),
                    summary.total_candidates,
                    summary.average
                )?;
                if let Some(top) = &summary.top_alliance {
                    write!(f, " top=\"{}\"", top)?;
                }
                for tally in &summary.alliances {
                    write!(f, "\n  {:>4}  {}", tally.candidates, tally.nombre)?;
                }
                Ok(())
            }
            ViewDescription::Error {
                message,
                can_retry,
                can_go_back,
            } => {
                write!(f, "[error] {}", message)?;
                if *can_retry {
                    write!(f, " [reintentar]")?;
                }
                if *can_go_back {
                    write!(f, " [volver]")?;
                }
                Ok(())
            }
        }
    }
}
