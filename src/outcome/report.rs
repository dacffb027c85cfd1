//! Caller-facing view of an outcome: status code, message, retry advice.

use serde::Serialize;

use super::Outcome;

/// Caller-visible summary of an [`Outcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeReport {
    /// HTTP-style status code.
    pub status: u16,
    pub code: &'static str,
    pub message: String,
    /// Whether the caller may retry the whole call later.
    pub retryable: bool,
}

/// Map an outcome to its report. Pure.
pub fn report<R>(outcome: &Outcome<R>) -> OutcomeReport {
    let (status, message, retryable) = match outcome {
        Outcome::Applied(versioned) => (
            200,
            format!("mutation committed at version {}", versioned.version),
            false,
        ),
        Outcome::PreconditionFailed { reason } => {
            (422, format!("precondition failed: {}", reason), false)
        }
        Outcome::NotFound { collection, id } => {
            (404, format!("record not found: {}:{}", collection, id), false)
        }
        Outcome::ConflictExhausted { attempts } => (
            409,
            format!(
                "version conflict persisted after {} attempt(s); retry later",
                attempts
            ),
            true,
        ),
        Outcome::StoreError(err) => {
            let status = if err.is_transient() { 503 } else { 500 };
            (status, err.to_string(), err.is_transient())
        }
        Outcome::Cancelled { attempts } => (
            408,
            format!("cancelled after {} attempt(s)", attempts),
            true,
        ),
    };

    OutcomeReport {
        status,
        code: outcome.code(),
        message,
        retryable,
    }
}
