use std::collections::{BTreeMap, HashMap, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::subscription::{Callback, Change, SubscriberError, Unsubscribe};

/// Key that receives every change.
pub const WILDCARD: &str = "*";

/// How many subscriber failures are retained for inspection.
const MAX_SUBSCRIBER_ERRORS: usize = 100;

/// What a write did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Value replaced and subscribers notified.
    Changed,
    /// Equal to the current value; nobody notified.
    Unchanged,
    /// Issued during a notification round; applied once the round completes.
    Queued,
}

/// Key and subscriber counts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoreStats {
    pub keys: usize,
    pub subscribers: BTreeMap<String, usize>,
}

enum PendingWrite {
    Set(String, Value),
    Batch(Vec<(String, Value)>),
    Remove(String),
    Reset,
}

/// A change plus the callbacks that were registered when it was committed.
struct Delivery {
    change: Change,
    targets: Vec<(String, Callback)>,
}

pub(super) struct StoreInner {
    values: HashMap<String, Arc<Value>>,
    /// Per key, in registration order.
    subscribers: HashMap<String, Vec<(String, Callback)>>,
    pending: VecDeque<PendingWrite>,
    notifying: bool,
    closed: bool,
    errors: VecDeque<SubscriberError>,
}

impl StoreInner {
    pub(super) fn remove_subscriber(&mut self, key: &str, id: &str) -> bool {
        let Some(list) = self.subscribers.get_mut(key) else {
            return false;
        };
        let before = list.len();
        list.retain(|(sub_id, _)| sub_id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.subscribers.remove(key);
        }
        removed
    }

    fn targets_for(&self, key: &str) -> Vec<(String, Callback)> {
        let mut targets: Vec<(String, Callback)> = self
            .subscribers
            .get(key)
            .map(|list| list.clone())
            .unwrap_or_default();
        if let Some(global) = self.subscribers.get(WILDCARD) {
            targets.extend(global.iter().cloned());
        }
        targets
    }

    /// Replace the value under `key` if it differs; returns the change.
    fn replace(&mut self, key: String, value: Value) -> Option<Change> {
        let null = Value::Null;
        let current = self.values.get(&key).map(|v| v.as_ref()).unwrap_or(&null);
        if *current == value {
            return None;
        }

        let new = Arc::new(value);
        let previous = if new.is_null() {
            self.values.remove(&key)
        } else {
            self.values.insert(key.clone(), Arc::clone(&new))
        };
        let old = previous.unwrap_or_else(|| Arc::new(Value::Null));

        Some(Change { key, new, old })
    }

    fn commit(&mut self, write: PendingWrite) -> Vec<Delivery> {
        match write {
            PendingWrite::Set(key, value) => self
                .replace(key, value)
                .map(|change| self.delivery(change))
                .into_iter()
                .collect(),
            PendingWrite::Batch(entries) => {
                let changes: Vec<Change> = entries
                    .into_iter()
                    .filter_map(|(key, value)| self.replace(key, value))
                    .collect();
                if !changes.is_empty() {
                    tracing::debug!(changes = changes.len(), "Batch state update");
                }
                changes.into_iter().map(|c| self.delivery(c)).collect()
            }
            PendingWrite::Remove(key) => self
                .replace(key, Value::Null)
                .map(|change| self.delivery(change))
                .into_iter()
                .collect(),
            PendingWrite::Reset => {
                let mut keys: Vec<String> = self.values.keys().cloned().collect();
                keys.sort();
                let global = self.subscribers.get(WILDCARD).cloned().unwrap_or_default();
                keys.into_iter()
                    .filter_map(|key| self.replace(key, Value::Null))
                    .map(|change| Delivery {
                        change,
                        targets: global.clone(),
                    })
                    .collect()
            }
        }
    }

    fn delivery(&self, change: Change) -> Delivery {
        let targets = self.targets_for(&change.key);
        Delivery { change, targets }
    }

    fn record_error(&mut self, error: SubscriberError) {
        if self.errors.len() == MAX_SUBSCRIBER_ERRORS {
            self.errors.pop_front();
        }
        self.errors.push_back(error);
    }
}

/// Publish/subscribe state container.
///
/// Cheap to clone; clones share the same state. Notification is synchronous:
/// when `set` returns [`WriteOutcome::Changed`], every subscriber of that key
/// has already run, in registration order, followed by the wildcard
/// subscribers. The internal lock is never held while a callback runs.
///
/// Writes issued while a notification round is in progress (from a
/// subscriber, or from another thread) are queued and applied in order by the
/// writer that started the round, once it completes.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Mutex<StoreInner>>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                values: HashMap::new(),
                subscribers: HashMap::new(),
                pending: VecDeque::new(),
                notifying: false,
                closed: false,
                errors: VecDeque::new(),
            })),
        }
    }

    /// Subscribe with a generated subscriber id.
    pub fn subscribe<F>(&self, key: &str, callback: F) -> Unsubscribe
    where
        F: Fn(&Change) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = format!("{}_{}", key, uuid::Uuid::new_v4());
        self.subscribe_with_id(key, &id, callback)
    }

    /// Subscribe under an explicit id.
    ///
    /// Re-using an id on the same key replaces the earlier callback in place.
    pub fn subscribe_with_id<F>(&self, key: &str, id: &str, callback: F) -> Unsubscribe
    where
        F: Fn(&Change) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let mut guard = self.inner.lock();
        if guard.closed {
            tracing::warn!(key, subscriber = id, "Subscribe after store teardown ignored");
        } else {
            let callback: Callback = Arc::new(callback);
            let list = guard.subscribers.entry(key.to_string()).or_default();
            match list.iter_mut().find(|(sub_id, _)| sub_id == id) {
                Some(slot) => slot.1 = callback,
                None => list.push((id.to_string(), callback)),
            }
            tracing::debug!(key, subscriber = id, "Observer registered");
        }

        Unsubscribe {
            store: Arc::downgrade(&self.inner),
            key: key.to_string(),
            id: id.to_string(),
        }
    }

    /// Replace the value under `key`, notifying subscribers if it changed.
    pub fn set(&self, key: &str, value: Value) -> WriteOutcome {
        if key == WILDCARD {
            tracing::warn!("Refusing to write the wildcard key");
            return WriteOutcome::Unchanged;
        }
        self.write(PendingWrite::Set(key.to_string(), value))
    }

    /// Serialize `value` and [`set`](Self::set) it.
    pub fn set_as<T: Serialize>(&self, key: &str, value: &T) -> Result<WriteOutcome, serde_json::Error> {
        Ok(self.set(key, serde_json::to_value(value)?))
    }

    /// Apply several writes, then notify each changed key in the given order.
    pub fn update<I, K>(&self, entries: I) -> WriteOutcome
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let entries: Vec<(String, Value)> = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .filter(|(k, _)| k != WILDCARD)
            .collect();
        self.write(PendingWrite::Batch(entries))
    }

    pub fn remove(&self, key: &str) -> WriteOutcome {
        self.write(PendingWrite::Remove(key.to_string()))
    }

    /// Clear every value. Wildcard subscribers see one change per removed key.
    pub fn reset(&self) -> WriteOutcome {
        let outcome = self.write(PendingWrite::Reset);
        tracing::info!("Store reset to initial state");
        outcome
    }

    pub fn get(&self, key: &str) -> Option<Arc<Value>> {
        self.inner.lock().values.get(key).cloned()
    }

    /// Decode the value under `key`; `Ok(None)` when absent.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, serde_json::Error> {
        match self.get(key) {
            Some(value) => T::deserialize(value.as_ref()).map(Some),
            None => Ok(None),
        }
    }

    /// Copy of the whole state. Values are shared and immutable.
    pub fn get_all(&self) -> BTreeMap<String, Arc<Value>> {
        self.inner
            .lock()
            .values
            .iter()
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .collect()
    }

    pub fn stats(&self) -> StoreStats {
        let guard = self.inner.lock();
        StoreStats {
            keys: guard.values.len(),
            subscribers: guard
                .subscribers
                .iter()
                .map(|(k, list)| (k.clone(), list.len()))
                .collect(),
        }
    }

    /// Recent subscriber failures, oldest first.
    pub fn subscriber_errors(&self) -> Vec<SubscriberError> {
        self.inner.lock().errors.iter().cloned().collect()
    }

    /// Drop every subscriber and reject new ones. Values are kept.
    pub fn teardown(&self) {
        let mut guard = self.inner.lock();
        guard.closed = true;
        guard.subscribers.clear();
        guard.pending.clear();
        tracing::info!("Store torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.lock().closed
    }

    fn write(&self, write: PendingWrite) -> WriteOutcome {
        let mut guard = self.inner.lock();
        if guard.notifying {
            guard.pending.push_back(write);
            return WriteOutcome::Queued;
        }

        let mut batch = guard.commit(write);
        if batch.is_empty() {
            return WriteOutcome::Unchanged;
        }
        guard.notifying = true;
        drop(guard);

        loop {
            self.deliver(batch);

            let mut guard = self.inner.lock();
            match guard.pending.pop_front() {
                Some(next) => batch = guard.commit(next),
                None => {
                    guard.notifying = false;
                    break;
                }
            }
        }

        WriteOutcome::Changed
    }

    fn deliver(&self, batch: Vec<Delivery>) {
        for Delivery { change, targets } in batch {
            tracing::debug!(key = %change.key, subscribers = targets.len(), "State updated");
            for (id, callback) in targets {
                let failure = match catch_unwind(AssertUnwindSafe(|| callback(&change))) {
                    Ok(Ok(())) => None,
                    Ok(Err(err)) => Some(SubscriberError::Failed {
                        subscriber: id,
                        key: change.key.clone(),
                        message: format!("{:#}", err),
                    }),
                    Err(panic) => Some(SubscriberError::Panicked {
                        subscriber: id,
                        key: change.key.clone(),
                        message: panic_message(panic.as_ref()),
                    }),
                };

                if let Some(error) = failure {
                    tracing::error!(error = %error, "Observer error");
                    self.inner.lock().record_error(error);
                }
            }
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_then_get() {
        let store = Store::new();
        assert_eq!(store.set("a", json!(1)), WriteOutcome::Changed);
        assert_eq!(*store.get("a").unwrap(), json!(1));
        assert!(store.get("b").is_none());
    }

    #[test]
    fn setting_null_removes_key() {
        let store = Store::new();
        store.set("a", json!("x"));
        store.set("a", Value::Null);
        assert!(store.get("a").is_none());
        assert_eq!(store.stats().keys, 0);
    }

    #[test]
    fn null_on_absent_key_is_noop() {
        let store = Store::new();
        assert_eq!(store.set("a", Value::Null), WriteOutcome::Unchanged);
    }

    #[test]
    fn wildcard_key_is_not_writable() {
        let store = Store::new();
        assert_eq!(store.set(WILDCARD, json!(1)), WriteOutcome::Unchanged);
        assert!(store.get(WILDCARD).is_none());
    }

    #[test]
    fn error_log_is_bounded() {
        let store = Store::new();
        let _sub = store.subscribe("k", |_| Err(anyhow::anyhow!("nope")));
        for i in 0..(MAX_SUBSCRIBER_ERRORS + 5) {
            store.set("k", json!(i));
        }
        assert_eq!(store.subscriber_errors().len(), MAX_SUBSCRIBER_ERRORS);
    }

    #[test]
    fn panic_message_extracts_strings() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
    }
}
