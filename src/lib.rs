//! Optimistic-concurrency mutations over keyed record stores.
//!
//! Every record carries a version that grows by one on each committed
//! change. The [`MutationEngine`] reads a record, checks a business
//! precondition, computes the new attributes and asks the store to write
//! them only if the version is still the one it read. Lost races are retried
//! under a [`RetryPolicy`]; everything else ends the call with an
//! [`Outcome`].

// Lets `#[derive(Record)]` expand to `versioned_mutation::Record` inside this crate.
extern crate self as versioned_mutation;

pub mod engine;
pub mod inventory;
pub mod mutation;
pub mod outcome;
pub mod record;
pub mod retry;
pub mod store;

#[cfg(feature = "emitter")]
pub mod emitter;
#[cfg(feature = "http")]
pub mod http;

pub use engine::MutationEngine;
pub use mutation::{FnMutation, Mutation, MutationRequest};
pub use outcome::{report, Outcome, OutcomeReport};
pub use record::{Record, Versioned};
pub use retry::{Backoff, CancelToken, RetryPolicy};
pub use store::{InMemoryRecordStore, RecordStore, StoreError};

#[cfg(feature = "emitter")]
pub use emitter::{OutcomeEmitter, OutcomeNotice};

// Derive macro for `Record`.
pub use versioned_mutation_macros::Record;
