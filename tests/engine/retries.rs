//! Retry policy behaviour against scripted stores.

use std::time::{Duration, Instant};

use versioned_mutation::inventory::{reserve, Reserve};
use versioned_mutation::{Backoff, CancelToken, MutationEngine, Outcome, RetryPolicy, Versioned};

use crate::support::{seeded_store, stored_widget, widget, ScriptedStore};

fn no_backoff(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new()
        .with_max_attempts(max_attempts)
        .with_backoff(Backoff::None)
}

#[test]
fn always_conflicting_store_exhausts_after_exact_attempts() {
    for max_attempts in [1, 3, 5] {
        let store = ScriptedStore::new(seeded_store(100)).always_conflict();
        let engine = MutationEngine::with_policy(store, no_backoff(max_attempts));

        let outcome = reserve(&engine, "sku-1", 1);

        assert_eq!(
            outcome,
            Outcome::ConflictExhausted {
                attempts: max_attempts
            }
        );
        assert_eq!(engine.store().fetches(), max_attempts as usize);
        assert_eq!(engine.store().updates(), max_attempts as usize);
    }
}

#[test]
fn default_policy_makes_three_attempts() {
    let store = ScriptedStore::new(seeded_store(100)).always_conflict();
    let engine = MutationEngine::with_policy(
        store,
        RetryPolicy::default().with_backoff(Backoff::None),
    );

    assert_eq!(
        reserve(&engine, "sku-1", 1),
        Outcome::ConflictExhausted { attempts: 3 }
    );
    assert_eq!(engine.store().fetches(), 3);
}

#[test]
fn failed_conditional_update_leaves_record_unchanged() {
    let store = ScriptedStore::new(seeded_store(100)).always_conflict();
    let engine = MutationEngine::with_policy(store, no_backoff(4));

    let _ = reserve(&engine, "sku-1", 30);

    assert_eq!(
        stored_widget(engine.store().inner()),
        Versioned::new(widget(100), 1)
    );
}

#[test]
fn precondition_failure_never_reaches_conditional_update() {
    let store = ScriptedStore::new(seeded_store(5)).always_conflict();
    let engine = MutationEngine::with_policy(store, no_backoff(5));

    let outcome = engine.submit("sku-1", &Reserve::new(10));

    assert!(matches!(outcome, Outcome::PreconditionFailed { .. }));
    assert_eq!(engine.store().fetches(), 1);
    assert_eq!(engine.store().updates(), 0);
}

#[test]
fn fixed_backoff_sleeps_between_attempts_only() {
    let store = ScriptedStore::new(seeded_store(100)).always_conflict();
    let policy = RetryPolicy::new()
        .with_max_attempts(3)
        .with_backoff(Backoff::Fixed { delay_ms: 100 });
    let engine = MutationEngine::with_policy(store, policy);

    let started = Instant::now();
    let outcome = reserve(&engine, "sku-1", 1);
    let elapsed = started.elapsed();

    assert_eq!(outcome, Outcome::ConflictExhausted { attempts: 3 });
    // Two waits: after attempts 1 and 2, none after the last.
    assert!(elapsed >= Duration::from_millis(200), "{:?}", elapsed);
    assert!(elapsed < Duration::from_millis(300), "{:?}", elapsed);
}

#[test]
fn backoff_past_the_timeout_ends_the_call_without_sleeping() {
    let store = ScriptedStore::new(seeded_store(100)).always_conflict();
    let policy = RetryPolicy::new()
        .with_max_attempts(5)
        .with_backoff(Backoff::Fixed { delay_ms: 500 })
        .with_timeout(Duration::from_millis(10));
    let engine = MutationEngine::with_policy(store, policy);

    let started = Instant::now();
    let outcome = reserve(&engine, "sku-1", 1);
    let elapsed = started.elapsed();

    assert_eq!(outcome, Outcome::Cancelled { attempts: 1 });
    assert!(elapsed < Duration::from_millis(250), "{:?}", elapsed);
    assert_eq!(engine.store().updates(), 1);
}

#[test]
fn backoff_within_the_timeout_still_retries() {
    let store = ScriptedStore::new(seeded_store(100)).always_conflict();
    let policy = RetryPolicy::new()
        .with_max_attempts(3)
        .with_backoff(Backoff::Fixed { delay_ms: 1 })
        .with_timeout(Duration::from_secs(10));
    let engine = MutationEngine::with_policy(store, policy);

    assert_eq!(
        reserve(&engine, "sku-1", 1),
        Outcome::ConflictExhausted { attempts: 3 }
    );
    assert_eq!(engine.store().updates(), 3);
}

#[test]
fn expired_timeout_cancels_before_first_attempt() {
    let store = ScriptedStore::new(seeded_store(100));
    let policy = RetryPolicy::new().with_timeout(Duration::ZERO);
    let engine = MutationEngine::with_policy(store, policy);

    let outcome = reserve(&engine, "sku-1", 1);

    assert_eq!(outcome, Outcome::Cancelled { attempts: 0 });
    assert_eq!(engine.store().fetches(), 0);
    assert_eq!(stored_widget(engine.store().inner()).version, 1);
}

#[test]
fn cancellation_is_honored_between_attempts() {
    let cancel = CancelToken::new();
    let trigger = cancel.clone();

    let store = ScriptedStore::new(seeded_store(100)).before_first_update(move |inner| {
        trigger.cancel();
        let rival = MutationEngine::new(inner.clone());
        assert!(reserve(&rival, "sku-1", 10).is_applied());
    });
    let engine = MutationEngine::with_policy(store, no_backoff(5));

    let outcome = engine.submit_with_cancel("sku-1", &Reserve::new(10), &cancel);

    // The in-flight update ran to completion (and lost); no second attempt.
    assert_eq!(outcome, Outcome::Cancelled { attempts: 1 });
    assert_eq!(engine.store().updates(), 1);
    assert_eq!(
        stored_widget(engine.store().inner()),
        Versioned::new(widget(90), 2)
    );
}
