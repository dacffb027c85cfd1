//! Outcome notifications on top of `event-emitter-rs`.
//!
//! Requires the `emitter` feature (on by default).

mod outcome_emitter;

pub use outcome_emitter::{OutcomeEmitter, OutcomeNotice};
