use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;

use centro_control::store::{Store, SubscriberError, WriteOutcome, WILDCARD};

type Log = Arc<Mutex<Vec<String>>>;

fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn recorder(log: &Log, label: &'static str) -> impl Fn(&centro_control::store::Change) -> anyhow::Result<()> {
    let log = Arc::clone(log);
    move |change| {
        log.lock().push(format!("{}:{}={}", label, change.key, change.new));
        Ok(())
    }
}

#[test]
fn test_equal_value_does_not_notify() {
    let store = Store::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let _sub = store.subscribe("k", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    assert_eq!(store.set("k", json!({"a": [1, 2]})), WriteOutcome::Changed);
    assert_eq!(store.set("k", json!({"a": [1, 2]})), WriteOutcome::Unchanged);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_change_carries_old_and_new() {
    let store = Store::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _sub = store.subscribe("k", move |change| {
        sink.lock().push(((*change.old).clone(), (*change.new).clone()));
        Ok(())
    });

    store.set("k", json!(1));
    store.set("k", json!(2));

    assert_eq!(
        *seen.lock(),
        vec![
            (serde_json::Value::Null, json!(1)),
            (json!(1), json!(2)),
        ]
    );
}

#[test]
fn test_failing_subscriber_does_not_block_others() {
    let store = Store::new();
    let log = log();
    let _a = store.subscribe_with_id("k", "broken", |_| anyhow::bail!("subscriber exploded"));
    let _b = store.subscribe_with_id("k", "panicky", |_| panic!("subscriber panicked"));
    let _c = store.subscribe("k", recorder(&log, "ok"));

    assert_eq!(store.set("k", json!(true)), WriteOutcome::Changed);
    assert_eq!(*log.lock(), vec!["ok:k=true"]);

    let errors = store.subscriber_errors();
    assert_eq!(errors.len(), 2);
    assert!(matches!(
        &errors[0],
        SubscriberError::Failed { subscriber, message, .. }
            if subscriber == "broken" && message.contains("exploded")
    ));
    assert!(matches!(
        &errors[1],
        SubscriberError::Panicked { subscriber, .. } if subscriber == "panicky"
    ));
}

#[test]
fn test_key_subscribers_run_before_wildcard_in_registration_order() {
    let store = Store::new();
    let log = log();
    let _w = store.subscribe(WILDCARD, recorder(&log, "wild"));
    let _a = store.subscribe("k", recorder(&log, "first"));
    let _b = store.subscribe("k", recorder(&log, "second"));
    let _other = store.subscribe("other", recorder(&log, "other"));

    store.set("k", json!(1));

    assert_eq!(*log.lock(), vec!["first:k=1", "second:k=1", "wild:k=1"]);
}

#[test]
fn test_reentrant_set_is_queued_until_round_completes() {
    let store = Store::new();
    let log = log();

    let inner = store.clone();
    let inner_log = Arc::clone(&log);
    let _a = store.subscribe("a", move |change| {
        inner_log.lock().push(format!("a:{}", change.new));
        if *change.new == json!(1) {
            assert_eq!(inner.set("b", json!(2)), WriteOutcome::Queued);
            // Not applied yet
            assert!(inner.get("b").is_none());
        }
        Ok(())
    });
    let _b = store.subscribe("b", recorder(&log, "b"));
    let _w = store.subscribe(WILDCARD, recorder(&log, "wild"));

    assert_eq!(store.set("a", json!(1)), WriteOutcome::Changed);

    assert_eq!(
        *log.lock(),
        vec!["a:1", "wild:a=1", "b:b=2", "wild:b=2"]
    );
    assert_eq!(*store.get("b").unwrap(), json!(2));
}

#[test]
fn test_subscribe_during_round_applies_to_next_round() {
    let store = Store::new();
    let log = log();

    let inner = store.clone();
    let late_log = Arc::clone(&log);
    let _a = store.subscribe_with_id("k", "registrar", move |_| {
        let _late = inner.subscribe_with_id("k", "late", recorder(&late_log, "late"));
        Ok(())
    });

    store.set("k", json!(1));
    assert!(log.lock().is_empty());

    store.set("k", json!(2));
    assert_eq!(*log.lock(), vec!["late:k=2"]);
}

#[test]
fn test_same_id_replaces_callback_in_place() {
    let store = Store::new();
    let log = log();
    let _a = store.subscribe_with_id("k", "view", recorder(&log, "old"));
    let _b = store.subscribe_with_id("k", "tail", recorder(&log, "tail"));
    let _c = store.subscribe_with_id("k", "view", recorder(&log, "new"));

    store.set("k", json!(1));

    assert_eq!(*log.lock(), vec!["new:k=1", "tail:k=1"]);
    assert_eq!(store.stats().subscribers.get("k"), Some(&2));
}

#[test]
fn test_dispose_is_idempotent_and_safe_after_teardown() {
    let store = Store::new();
    let log = log();
    let sub = store.subscribe("k", recorder(&log, "x"));
    let id = sub.id().to_string();
    assert!(sub.dispose());

    store.set("k", json!(1));
    assert!(log.lock().is_empty());

    let again = store.subscribe_with_id("k", &id, recorder(&log, "x"));
    store.teardown();
    assert!(!again.dispose());

    let dropped = Store::new();
    let orphan = dropped.subscribe("k", |_| Ok(()));
    drop(dropped);
    assert!(!orphan.dispose());
}

#[test]
fn test_teardown_rejects_new_subscriptions_but_keeps_values() {
    let store = Store::new();
    store.set("k", json!("kept"));
    store.teardown();

    let log = log();
    let _sub = store.subscribe("k", recorder(&log, "late"));
    store.set("k", json!("changed"));

    assert!(log.lock().is_empty());
    assert!(store.is_torn_down());
    assert_eq!(*store.get("k").unwrap(), json!("changed"));
    assert!(store.stats().subscribers.is_empty());
}

#[test]
fn test_batch_update_notifies_in_given_order() {
    let store = Store::new();
    let log = log();
    let _w = store.subscribe(WILDCARD, recorder(&log, "wild"));
    store.set("same", json!(0));
    log.lock().clear();

    store.update([
        ("z", json!(1)),
        ("same", json!(0)),
        ("a", json!(2)),
    ]);

    assert_eq!(*log.lock(), vec!["wild:z=1", "wild:a=2"]);
}

#[test]
fn test_reset_notifies_wildcard_for_each_key() {
    let store = Store::new();
    store.set("b", json!(1));
    store.set("a", json!(2));

    let log = log();
    let _w = store.subscribe(WILDCARD, recorder(&log, "wild"));
    let _k = store.subscribe("a", recorder(&log, "key"));

    store.reset();

    assert_eq!(*log.lock(), vec!["wild:a=null", "wild:b=null"]);
    assert!(store.get_all().is_empty());
}

#[test]
fn test_get_all_is_a_snapshot() {
    let store = Store::new();
    store.set("a", json!([1, 2, 3]));
    let snapshot = store.get_all();

    store.set("a", json!([4]));

    assert_eq!(*snapshot["a"], json!([1, 2, 3]));
    assert_eq!(*store.get("a").unwrap(), json!([4]));
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Selection {
    id: u64,
    nombre: String,
}

#[test]
fn test_typed_helpers() {
    let store = Store::new();
    let selection = Selection {
        id: 3,
        nombre: "Norte".into(),
    };
    store.set_as("selection", &selection).unwrap();

    assert_eq!(store.get_as::<Selection>("selection").unwrap(), Some(selection));
    assert_eq!(store.get_as::<Selection>("absent").unwrap(), None);
    assert!(store.get_as::<u64>("selection").is_err());
}

#[test]
fn test_remove_notifies_with_null() {
    let store = Store::new();
    store.set("k", json!(1));
    let log = log();
    let _sub = store.subscribe("k", recorder(&log, "k"));

    assert_eq!(store.remove("k"), WriteOutcome::Changed);
    assert_eq!(store.remove("k"), WriteOutcome::Unchanged);
    assert_eq!(*log.lock(), vec!["k:k=null"]);
}

#[test]
fn test_concurrent_writers_all_land() {
    let store = Store::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let _sub = store.subscribe(WILDCARD, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = store.clone();
            std::thread::spawn(move || {
                for i in 0..50 {
                    store.set(&format!("t{t}"), json!(i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 8 * 50);
    for t in 0..8 {
        assert_eq!(*store.get(&format!("t{t}")).unwrap(), json!(49));
    }
}
