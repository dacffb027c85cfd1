//! Terminal outcomes that must not be retried.

use versioned_mutation::inventory::{reserve, StockItem};
use versioned_mutation::{report, Backoff, MutationEngine, Outcome, RetryPolicy, StoreError};

use crate::support::{seeded_store, ScriptedStore};

#[test]
fn missing_record_is_reported_once() {
    let store = ScriptedStore::new(seeded_store(100));
    let engine = MutationEngine::new(store);

    let outcome = reserve(&engine, "sku-404", 1);

    assert_eq!(
        outcome,
        Outcome::NotFound {
            collection: "stock_items".into(),
            id: "sku-404".into(),
        }
    );
    assert_eq!(engine.store().fetches(), 1);
    assert_eq!(engine.store().updates(), 0);
}

#[test]
fn deleted_record_is_not_found() {
    let store = seeded_store(100);
    let engine = MutationEngine::new(store.clone());
    assert!(store.delete::<StockItem>("sku-1").unwrap());

    let outcome = reserve(&engine, "sku-1", 1);
    assert!(matches!(outcome, Outcome::NotFound { .. }));
    assert_eq!(report(&outcome).status, 404);
}

#[test]
fn store_errors_are_propagated_without_retry() {
    let store = ScriptedStore::new(seeded_store(100))
        .failing_fetch(StoreError::Unavailable("connection reset".into()));
    let policy = RetryPolicy::new()
        .with_max_attempts(5)
        .with_backoff(Backoff::None);
    let engine = MutationEngine::with_policy(store, policy);

    let outcome = reserve(&engine, "sku-1", 1);

    assert_eq!(
        outcome,
        Outcome::StoreError(StoreError::Unavailable("connection reset".into()))
    );
    assert_eq!(engine.store().fetches(), 1);

    let summary = report(&outcome);
    assert_eq!(summary.status, 503);
    assert!(summary.retryable);
}
