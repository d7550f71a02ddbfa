use crate::api::{MunicipalityDetail, MunicipalitySummary};
use crate::resource::ChartKind;
use crate::ui::dashboard::failure::Failure;
use crate::ui::mvi::Intent;

#[derive(Debug, Clone)]
pub enum DashboardIntent {
    /// Bootstrap, or restart from scratch.
    Init,
    ListLoaded {
        entities: Vec<MunicipalitySummary>,
    },
    ListFailed {
        failure: Failure,
    },
    Select {
        id: u64,
    },
    DetailLoaded {
        id: u64,
        detail: MunicipalityDetail,
    },
    DetailFailed {
        id: u64,
        failure: Failure,
    },
    /// Leave results. `refetch` is decided by the back policy.
    Back {
        refetch: bool,
    },
    Retry,
    Home,
    Search {
        query: String,
    },
    SwitchChart {
        kind: ChartKind,
    },
}

impl Intent for DashboardIntent {}

impl DashboardIntent {
    pub fn name(&self) -> &'static str {
        match self {
            DashboardIntent::Init => "init",
            DashboardIntent::ListLoaded { .. } => "list_loaded",
            DashboardIntent::ListFailed { .. } => "list_failed",
            DashboardIntent::Select { .. } => "select",
            DashboardIntent::DetailLoaded { .. } => "detail_loaded",
            DashboardIntent::DetailFailed { .. } => "detail_failed",
            DashboardIntent::Back { .. } => "back",
            DashboardIntent::Retry => "retry",
            DashboardIntent::Home => "home",
            DashboardIntent::Search { .. } => "search",
            DashboardIntent::SwitchChart { .. } => "switch_chart",
        }
    }

    /// Intents that restart the pending fetch even if the view did not change.
    pub fn forces_fetch(&self) -> bool {
        matches!(self, DashboardIntent::Init | DashboardIntent::Retry)
    }
}
