//! Outcomes of a mutation call.

mod report;

use crate::record::Versioned;
use crate::store::StoreError;

pub use report::{report, OutcomeReport};

/// Terminal result of one `apply`/`submit` call.
///
/// Every expected condition is a variant here; calls never return `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<R> {
    /// The mutation committed. Carries the new attributes and version.
    Applied(Versioned<R>),
    /// The business precondition rejected the current attributes.
    PreconditionFailed { reason: String },
    /// Every allowed attempt lost a version race.
    ConflictExhausted { attempts: u32 },
    /// No record exists under the key.
    NotFound { collection: String, id: String },
    /// The underlying store failed.
    StoreError(StoreError),
    /// The caller cancelled, or the policy timeout elapsed, before an attempt.
    Cancelled { attempts: u32 },
}

impl<R> Outcome<R> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    /// The committed value, if any.
    pub fn applied(&self) -> Option<&Versioned<R>> {
        match self {
            Outcome::Applied(versioned) => Some(versioned),
            _ => None,
        }
    }

    pub fn into_applied(self) -> Option<Versioned<R>> {
        match self {
            Outcome::Applied(versioned) => Some(versioned),
            _ => None,
        }
    }

    /// Short machine-readable name of the variant.
    pub fn code(&self) -> &'static str {
        match self {
            Outcome::Applied(_) => "applied",
            Outcome::PreconditionFailed { .. } => "precondition_failed",
            Outcome::ConflictExhausted { .. } => "conflict_exhausted",
            Outcome::NotFound { .. } => "not_found",
            Outcome::StoreError(_) => "store_error",
            Outcome::Cancelled { .. } => "cancelled",
        }
    }
}
