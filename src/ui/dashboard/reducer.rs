use crate::api::ResultsSummary;
use crate::ui::dashboard::failure::{Failure, Operation, Recovery};
use crate::ui::dashboard::intent::DashboardIntent;
use crate::ui::dashboard::state::{DashboardState, ViewState};
use crate::ui::mvi::Reducer;

pub struct DashboardReducer;

impl Reducer for DashboardReducer {
    type State = DashboardState;
    type Intent = DashboardIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            DashboardIntent::Init => DashboardState {
                view: ViewState::loading(Operation::LoadList),
                ..state
            },

            DashboardIntent::ListLoaded { entities } => match state.view {
                ViewState::Loading {
                    operation: Operation::LoadList,
                    ..
                } => DashboardState {
                    view: ViewState::Selector {
                        entities: entities.clone(),
                        query: String::new(),
                    },
                    catalog: entities,
                    ..state
                },
                _ => state,
            },

            DashboardIntent::ListFailed { failure } => match state.view {
                ViewState::Loading {
                    operation: Operation::LoadList,
                    ..
                } => DashboardState {
                    view: ViewState::Error { failure },
                    ..state
                },
                _ => state,
            },

            DashboardIntent::Select { id } => DashboardState {
                view: ViewState::loading(Operation::LoadDetail { id }),
                ..state
            },

            DashboardIntent::DetailLoaded { id, detail } => match &state.view {
                ViewState::Loading {
                    operation: Operation::LoadDetail { id: pending },
                    ..
                } if *pending == id => {
                    let summary = ResultsSummary::from_detail(&detail);
                    DashboardState {
                        view: ViewState::Results {
                            entity: detail,
                            summary,
                            chart: state.chart,
                        },
                        ..state
                    }
                }
                _ => state,
            },

            DashboardIntent::DetailFailed { id, failure } => match &state.view {
                ViewState::Loading {
                    operation: Operation::LoadDetail { id: pending },
                    ..
                } if *pending == id => DashboardState {
                    view: ViewState::Error { failure },
                    ..state
                },
                _ => state,
            },

            DashboardIntent::Back { refetch } => match &state.view {
                ViewState::Results { .. }
                | ViewState::Loading {
                    operation: Operation::LoadDetail { .. },
                    ..
                }
                | ViewState::Error { .. } => to_selector(state, refetch),
                _ => state,
            },

            DashboardIntent::Retry => match &state.view {
                ViewState::Error {
                    failure:
                        Failure {
                            recovery: Recovery::Retry { operation },
                            ..
                        },
                } => {
                    let operation = *operation;
                    DashboardState {
                        view: ViewState::loading(operation),
                        ..state
                    }
                }
                _ => state,
            },

            DashboardIntent::Home => to_selector(state, false),

            DashboardIntent::Search { query } => match state.view {
                ViewState::Selector { entities, .. } => DashboardState {
                    view: ViewState::Selector { entities, query },
                    ..state
                },
                view => DashboardState { view, ..state },
            },

            DashboardIntent::SwitchChart { kind } => match state.view {
                ViewState::Results {
                    entity, summary, ..
                } => DashboardState {
                    view: ViewState::Results {
                        entity,
                        summary,
                        chart: kind,
                    },
                    chart: kind,
                    ..state
                },
                view => DashboardState { view, ..state },
            },
        }
    }
}

/// Selector with the known catalog, or a fresh list load when it is empty
/// or a refetch was requested.
fn to_selector(state: DashboardState, refetch: bool) -> DashboardState {
    if refetch || state.catalog.is_empty() {
        return DashboardState {
            view: ViewState::loading(Operation::LoadList),
            ..state
        };
    }
    DashboardState {
        view: ViewState::Selector {
            entities: state.catalog.clone(),
            query: String::new(),
        },
        ..state
    }
}
