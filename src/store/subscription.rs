use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::state::StoreInner;

/// Callback invoked on every change of a subscribed key.
pub type Callback = Arc<dyn Fn(&Change) -> anyhow::Result<()> + Send + Sync>;

/// One committed change, handed to subscribers.
///
/// An absent value is represented as `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub key: String,
    pub new: Arc<Value>,
    pub old: Arc<Value>,
}

impl Change {
    /// Decode the new value into a schema type.
    pub fn new_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(self.new.as_ref())
    }
}

/// A subscriber failed while being notified. Logged, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriberError {
    #[error("Subscriber '{subscriber}' failed on '{key}': {message}")]
    Failed {
        subscriber: String,
        key: String,
        message: String,
    },

    #[error("Subscriber '{subscriber}' panicked on '{key}': {message}")]
    Panicked {
        subscriber: String,
        key: String,
        message: String,
    },
}

/// Disposer returned by [`Store::subscribe`](super::Store::subscribe).
///
/// Disposing after the store was torn down or dropped is a no-op.
#[must_use = "dropping the disposer keeps the subscription alive; call dispose() to remove it"]
#[derive(Debug)]
pub struct Unsubscribe {
    pub(super) store: Weak<Mutex<StoreInner>>,
    pub(super) key: String,
    pub(super) id: String,
}

impl Unsubscribe {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Remove the subscription. Returns whether a callback was removed.
    pub fn dispose(self) -> bool {
        let Some(inner) = self.store.upgrade() else {
            return false;
        };
        let mut guard = inner.lock();
        let removed = guard.remove_subscriber(&self.key, &self.id);
        if removed {
            tracing::debug!(key = %self.key, subscriber = %self.id, "Observer unregistered");
        }
        removed
    }
}
