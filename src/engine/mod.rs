//! MutationEngine - optimistic read-check-write-retry over a record store.
//!
//! Each attempt reads the record, checks the precondition, computes the new
//! attributes and asks the store to swap them in only if the version it read
//! is still current. A lost race costs one round trip and a fresh read; no
//! lock is held between the read and the write.

use std::thread;
use std::time::Instant;

use tracing::{debug, info_span, warn};

use crate::mutation::{FnMutation, Mutation, MutationAttempt};
use crate::outcome::Outcome;
use crate::record::{Record, Versioned};
use crate::retry::{CancelToken, RetryPolicy};
use crate::store::{RecordStore, StoreError};

/// What a single attempt ended in.
enum Step<R> {
    Done(Outcome<R>),
    Conflict { observed_version: u64 },
}

/// Versioned mutation engine.
///
/// Stateless apart from its configuration: any number of threads may call
/// into one engine (or into many engines over the same store) at once.
/// All coordination happens in the store's conditional update.
///
/// ## Example
///
/// ```ignore
/// use versioned_mutation::{InMemoryRecordStore, MutationEngine, Outcome};
///
/// let engine = MutationEngine::new(InMemoryRecordStore::new());
/// let outcome = engine.apply(
///     "sku-1",
///     |item: &StockItem| item.with_quantity(item.quantity - 10),
///     |item| item.quantity >= 10,
/// );
/// ```
#[derive(Debug, Clone)]
pub struct MutationEngine<S> {
    store: S,
    policy: RetryPolicy,
}

impl<S: RecordStore> MutationEngine<S> {
    /// Create an engine with the default retry policy.
    pub fn new(store: S) -> Self {
        Self::with_policy(store, RetryPolicy::default())
    }

    pub fn with_policy(store: S, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Apply `transform` to the record under `id` if `precondition` holds.
    ///
    /// Both closures may borrow from the caller and may run once per attempt.
    pub fn apply<R, F, P>(&self, id: &str, transform: F, precondition: P) -> Outcome<R>
    where
        R: Record,
        F: Fn(&R) -> R,
        P: Fn(&R) -> bool,
    {
        self.submit(id, &FnMutation::new(transform, precondition))
    }

    /// Run a mutation against the record under `id`.
    pub fn submit<R, M>(&self, id: &str, mutation: &M) -> Outcome<R>
    where
        R: Record,
        M: Mutation<R> + ?Sized,
    {
        self.run(id, mutation, None)
    }

    /// Run a mutation, giving up before any attempt once `cancel` is set.
    pub fn submit_with_cancel<R, M>(&self, id: &str, mutation: &M, cancel: &CancelToken) -> Outcome<R>
    where
        R: Record,
        M: Mutation<R> + ?Sized,
    {
        self.run(id, mutation, Some(cancel))
    }

    fn run<R, M>(&self, id: &str, mutation: &M, cancel: Option<&CancelToken>) -> Outcome<R>
    where
        R: Record,
        M: Mutation<R> + ?Sized,
    {
        let span = info_span!("mutation", collection = R::COLLECTION, id);
        let _enter = span.enter();

        let started = Instant::now();
        let max_attempts = self.policy.attempts();

        for attempt in 1..=max_attempts {
            if cancel.is_some_and(CancelToken::is_cancelled) || self.policy.expired(started) {
                debug!(attempts = attempt - 1, "mutation cancelled");
                return Outcome::Cancelled {
                    attempts: attempt - 1,
                };
            }

            match self.attempt(id, mutation, attempt) {
                Step::Done(outcome) => return outcome,
                Step::Conflict { observed_version } => {
                    debug!(attempt, observed_version, "version conflict");
                    if self.policy.should_retry(attempt) {
                        let delay = self.policy.backoff.delay_for(attempt);
                        if self.policy.delay_overruns(started, delay) {
                            debug!(attempts = attempt, ?delay, "backoff would exceed timeout");
                            return Outcome::Cancelled { attempts: attempt };
                        }
                        if !delay.is_zero() {
                            thread::sleep(delay);
                        }
                    }
                }
            }
        }

        warn!(attempts = max_attempts, "conflict retries exhausted");
        Outcome::ConflictExhausted {
            attempts: max_attempts,
        }
    }

    /// One read-check-write cycle. Always reads fresh.
    fn attempt<R, M>(&self, id: &str, mutation: &M, index: u32) -> Step<R>
    where
        R: Record,
        M: Mutation<R> + ?Sized,
    {
        let current: Versioned<R> = match self.store.fetch(id) {
            Ok(Some(current)) => current,
            Ok(None) => {
                debug!("record not found");
                return Step::Done(Outcome::NotFound {
                    collection: R::COLLECTION.to_string(),
                    id: id.to_string(),
                });
            }
            Err(err) => return Step::Done(store_failure(err)),
        };

        if let Err(reason) = mutation.check(&current.data) {
            debug!(%reason, version = current.version, "precondition failed");
            return Step::Done(Outcome::PreconditionFailed { reason });
        }

        let attempt = MutationAttempt {
            index,
            observed_version: current.version,
            new_value: mutation.transform(&current.data),
        };

        let Some(new_version) = attempt.next_version() else {
            return Step::Done(store_failure(StoreError::Rejected(format!(
                "version overflow at {}",
                attempt.observed_version
            ))));
        };

        match self.store.conditional_update(
            id,
            attempt.observed_version,
            &attempt.new_value,
            new_version,
        ) {
            Ok(true) => {
                debug!(attempt = attempt.index, version = new_version, "mutation applied");
                Step::Done(Outcome::Applied(Versioned::new(attempt.new_value, new_version)))
            }
            Ok(false) => Step::Conflict {
                observed_version: attempt.observed_version,
            },
            Err(err) => Step::Done(store_failure(err)),
        }
    }
}

fn store_failure<R>(err: StoreError) -> Outcome<R> {
    warn!(error = %err, transient = err.is_transient(), "store failure");
    Outcome::StoreError(err)
}
