//! Drives the dashboard: owns the view state, starts fetches and reacts to
//! their outcomes through the store.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::api::{ElectoralApi, MunicipalityList};
use crate::cancel::CancelSignal;
use crate::config::{BackPolicy, DashboardConfig};
use crate::resource::{ChartKind, ChartSpec, DetachedFactory, ResourceFactory, ResourceRegistry};
use crate::store::{keys, Store, Unsubscribe, WILDCARD};
use crate::transport::Transport;
use crate::ui::dashboard::{DashboardIntent, DashboardReducer, DashboardState, Operation, ViewState};
use crate::ui::mvi::Reducer;
use crate::ui::outcome::{run_operation, FetchOutcome, OutcomeResult};
use crate::ui::view::ViewDescription;

/// Dispatch an intent to an MVI field via its reducer.
macro_rules! dispatch_mvi {
    ($self:expr, $field:ident, $reducer:ty, $intent:expr) => {
        $self.$field = <$reducer>::reduce(std::mem::take(&mut $self.$field), $intent);
    };
}

struct InFlight {
    generation: u64,
    operation: Operation,
    cancel: CancelSignal,
    handle: JoinHandle<()>,
}

/// Owns the current view and everything bound to it.
///
/// Transitions happen only through the user methods below or through fetch
/// outcomes delivered by the store subscription and applied by
/// [`next_event`](Self::next_event).
pub struct ViewController<T: Transport + 'static> {
    id: String,
    api: Arc<ElectoralApi<T>>,
    store: Store,
    state: DashboardState,
    back_policy: BackPolicy,
    resources: ResourceRegistry,
    factory: Arc<dyn ResourceFactory>,
    outcomes: mpsc::UnboundedReceiver<FetchOutcome>,
    subscriptions: Vec<Unsubscribe>,
    inflight: Option<InFlight>,
    generation: u64,
    catalog_loaded_at: Option<Instant>,
    torn_down: bool,
}

impl<T: Transport + 'static> ViewController<T> {
    pub fn new(api: Arc<ElectoralApi<T>>, store: Store, config: &DashboardConfig) -> Self {
        let id = format!("view_controller_{}", uuid::Uuid::new_v4());
        let (tx, rx) = mpsc::unbounded_channel();

        let source = id.clone();
        let outcome_sub = store.subscribe_with_id(keys::FETCH_OUTCOME, &id, move |change| {
            if change.new.is_null() {
                return Ok(());
            }
            let outcome: FetchOutcome = change.new_as()?;
            if outcome.source != source {
                return Ok(());
            }
            tx.send(outcome)
                .map_err(|_| anyhow::anyhow!("view controller no longer listening"))
        });
        let trace_sub = store.subscribe(WILDCARD, |change| {
            tracing::trace!(key = %change.key, cleared = change.new.is_null(), "State changed");
            Ok(())
        });

        Self {
            id,
            api,
            store,
            state: DashboardState::with_chart(config.default_chart),
            back_policy: config.back_policy,
            resources: ResourceRegistry::new(),
            factory: Arc::new(DetachedFactory),
            outcomes: rx,
            subscriptions: vec![outcome_sub, trace_sub],
            inflight: None,
            generation: 0,
            catalog_loaded_at: None,
            torn_down: false,
        }
    }

    /// Use `factory` to create chart resources.
    pub fn with_factory(mut self, factory: Arc<dyn ResourceFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Subscriber id on the store; also tags this controller's fetch outcomes.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn api(&self) -> &ElectoralApi<T> {
        &self.api
    }

    pub fn is_fetching(&self) -> bool {
        self.inflight.is_some()
    }

    pub fn describe(&self) -> ViewDescription {
        ViewDescription::of(&self.state.view)
    }

    /// Enter the loading view and fetch the municipality list.
    pub fn start(&mut self) -> ViewDescription {
        self.dispatch(DashboardIntent::Init);
        self.describe()
    }

    pub fn select(&mut self, id: u64) -> ViewDescription {
        self.dispatch(DashboardIntent::Select { id });
        self.describe()
    }

    /// Return to the selector, refetching the list if the back policy says so.
    pub fn back(&mut self) -> ViewDescription {
        let age = self.catalog_loaded_at.map(|loaded| loaded.elapsed());
        let refetch = self
            .back_policy
            .requires_refetch(age, self.state.catalog.is_empty());
        self.dispatch(DashboardIntent::Back { refetch });
        self.describe()
    }

    pub fn retry(&mut self) -> ViewDescription {
        self.dispatch(DashboardIntent::Retry);
        self.describe()
    }

    pub fn home(&mut self) -> ViewDescription {
        self.dispatch(DashboardIntent::Home);
        self.describe()
    }

    pub fn search(&mut self, query: &str) -> ViewDescription {
        self.dispatch(DashboardIntent::Search {
            query: query.to_string(),
        });
        self.describe()
    }

    pub fn switch_chart(&mut self, kind: ChartKind) -> ViewDescription {
        self.dispatch(DashboardIntent::SwitchChart { kind });
        self.describe()
    }

    /// Wait for the in-flight fetch and apply its outcome.
    ///
    /// Returns `None` when nothing is in flight. Outcomes of superseded
    /// fetches are dropped without touching the view.
    pub async fn next_event(&mut self) -> Option<ViewDescription> {
        loop {
            let current = self.inflight.as_ref()?.generation;
            let outcome = self.outcomes.recv().await?;

            if outcome.generation != current {
                tracing::debug!(
                    generation = outcome.generation,
                    current,
                    "Dropping stale fetch outcome"
                );
                continue;
            }

            self.inflight = None;
            self.apply_outcome(outcome);
            return Some(self.describe());
        }
    }

    /// Apply outcomes until no fetch is in flight.
    pub async fn settle(&mut self) -> ViewDescription {
        while self.next_event().await.is_some() {}
        self.describe()
    }

    /// Cancel the in-flight fetch, dispose resources and drop subscriptions.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.cancel_inflight();
        self.resources.dispose_all();
        for subscription in self.subscriptions.drain(..) {
            subscription.dispose();
        }
        self.outcomes.close();
        tracing::info!("View controller torn down");
    }

    fn dispatch(&mut self, intent: DashboardIntent) -> bool {
        if self.torn_down {
            tracing::warn!(intent = intent.name(), "Intent after teardown ignored");
            return false;
        }

        let name = intent.name();
        let forced = intent.forces_fetch();
        let previous = self.state.view.clone();
        dispatch_mvi!(self, state, DashboardReducer, intent);

        let changed = self.state.view != previous;
        if changed {
            tracing::info!(
                from = previous.name(),
                to = self.state.view.name(),
                intent = name,
                "View transition"
            );
            self.remount();
        }

        match self.state.view.pending_operation() {
            Some(operation) if changed || forced => self.begin_fetch(operation),
            Some(_) => {}
            None => self.cancel_inflight(),
        }

        self.commit_view();
        changed
    }

    /// Dispose the previous view's resources, then mount the current view's.
    fn remount(&mut self) {
        self.resources.dispose_all();

        if let ViewState::Results {
            entity,
            summary,
            chart,
        } = &self.state.view
        {
            let spec = ChartSpec {
                owner: format!("results:{}", entity.id),
                kind: *chart,
                labels: summary.labels(),
                values: summary.values(),
            };
            let resource = self.factory.create_chart(&spec);
            self.resources.bind(resource);
        }
    }

    fn begin_fetch(&mut self, operation: Operation) {
        self.cancel_inflight();

        self.generation += 1;
        let generation = self.generation;
        let cancel = CancelSignal::new();

        let api = Arc::clone(&self.api);
        let store = self.store.clone();
        let source = self.id.clone();
        let task_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            let result = run_operation(&api, operation, &task_cancel).await;
            let outcome = FetchOutcome {
                source,
                generation,
                operation,
                result,
            };
            if let Err(e) = store.set_as(keys::FETCH_OUTCOME, &outcome) {
                tracing::error!(error = %e, generation, "Failed to publish fetch outcome");
            }
        });

        tracing::debug!(generation, operation = ?operation, "Fetch started");
        self.inflight = Some(InFlight {
            generation,
            operation,
            cancel,
            handle,
        });
    }

    fn cancel_inflight(&mut self) {
        if let Some(inflight) = self.inflight.take() {
            inflight.cancel.cancel();
            inflight.handle.abort();
            tracing::debug!(
                generation = inflight.generation,
                operation = ?inflight.operation,
                "In-flight fetch cancelled"
            );
        }
    }

    fn apply_outcome(&mut self, outcome: FetchOutcome) {
        let intent = match (outcome.operation, outcome.result) {
            (_, OutcomeResult::Cancelled) => return,
            (Operation::LoadList, OutcomeResult::List { list }) => {
                self.catalog_loaded_at = Some(Instant::now());
                self.commit_list(&list);
                DashboardIntent::ListLoaded {
                    entities: list.items,
                }
            }
            (Operation::LoadList, OutcomeResult::Failed { failure }) => {
                self.store.set(keys::API_CONNECTED, json!(false));
                DashboardIntent::ListFailed { failure }
            }
            (Operation::LoadDetail { id }, OutcomeResult::Detail { detail }) => {
                self.store.set(keys::API_CONNECTED, json!(true));
                DashboardIntent::DetailLoaded { id, detail }
            }
            (Operation::LoadDetail { id }, OutcomeResult::Failed { failure }) => {
                DashboardIntent::DetailFailed { id, failure }
            }
            (operation, _) => {
                tracing::warn!(operation = ?operation, "Fetch outcome does not match its operation");
                return;
            }
        };
        self.dispatch(intent);
    }

    fn commit_list(&self, list: &MunicipalityList) {
        self.store.update([
            (keys::MUNICIPALITIES, to_json(&list.items)),
            (keys::METADATA, list.metadata.clone().unwrap_or(Value::Null)),
            (keys::API_CONNECTED, json!(true)),
        ]);
    }

    fn commit_view(&self) {
        let view = &self.state.view;
        let loading_message = match view {
            ViewState::Loading { message, .. } => json!(message),
            _ => Value::Null,
        };
        let error = match view {
            ViewState::Error { failure } => to_json(failure),
            _ => Value::Null,
        };
        let current = match view {
            ViewState::Results { entity, .. } => to_json(entity),
            _ => Value::Null,
        };

        self.store.update([
            (keys::CURRENT_VIEW, json!(view.name())),
            (keys::LOADING_MESSAGE, loading_message),
            (keys::ERROR, error),
            (keys::CURRENT_MUNICIPALITY, current),
            (keys::CHART_KIND, to_json(&self.state.chart)),
        ]);
    }
}

impl<T: Transport + 'static> Drop for ViewController<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn to_json<S: Serialize>(value: &S) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to serialize state value");
        Value::Null
    })
}
