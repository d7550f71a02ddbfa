use crate::api::{MunicipalityDetail, MunicipalitySummary, ResultsSummary};
use crate::resource::ChartKind;
use crate::ui::dashboard::failure::{Failure, Operation};
use crate::ui::mvi::UiState;

/// The view currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// Waiting for `operation` to resolve.
    Loading { message: String, operation: Operation },
    Selector {
        entities: Vec<MunicipalitySummary>,
        query: String,
    },
    Results {
        entity: MunicipalityDetail,
        summary: ResultsSummary,
        chart: ChartKind,
    },
    Error { failure: Failure },
}

impl ViewState {
    pub fn loading(operation: Operation) -> Self {
        ViewState::Loading {
            message: operation.loading_message().to_string(),
            operation,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ViewState::Loading { .. } => "loading",
            ViewState::Selector { .. } => "selector",
            ViewState::Results { .. } => "results",
            ViewState::Error { .. } => "error",
        }
    }

    /// The fetch this state is waiting on.
    pub fn pending_operation(&self) -> Option<Operation> {
        match self {
            ViewState::Loading { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}

/// Full dashboard state: the active view plus what survives across views.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub view: ViewState,
    /// Last municipality list that loaded successfully.
    pub catalog: Vec<MunicipalitySummary>,
    /// Chart kind used the next time results are mounted.
    pub chart: ChartKind,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            view: ViewState::loading(Operation::LoadList),
            catalog: Vec::new(),
            chart: ChartKind::default(),
        }
    }
}

impl UiState for DashboardState {}

impl DashboardState {
    pub fn with_chart(chart: ChartKind) -> Self {
        Self {
            chart,
            ..Self::default()
        }
    }
}

/// Entities whose name contains `query`, ignoring case and accents.
///
/// An empty (or blank) query matches everything.
pub fn filter_entities<'a>(
    entities: &'a [MunicipalitySummary],
    query: &str,
) -> Vec<&'a MunicipalitySummary> {
    let needle = fold(query.trim());
    if needle.is_empty() {
        return entities.iter().collect();
    }
    entities
        .iter()
        .filter(|e| fold(&e.nombre).contains(&needle))
        .collect()
}

fn fold(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}
