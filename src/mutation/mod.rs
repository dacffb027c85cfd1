//! Mutations - what to do to a record, and when not to.
//!
//! A mutation pairs a pure transform with an optional business precondition.
//! Both may run once per attempt, so neither may have side effects.

mod closure;
mod request;

pub use closure::FnMutation;
pub use request::MutationRequest;

/// A transformation of a record's attributes guarded by a precondition.
pub trait Mutation<R> {
    /// Check the business rule against the current attributes.
    ///
    /// Returns `Err(reason)` to reject the mutation. A rejection is final and
    /// is never retried.
    fn check(&self, current: &R) -> Result<(), String>;

    /// Compute the new attributes from the current ones.
    fn transform(&self, current: &R) -> R;
}

impl<R, M: Mutation<R> + ?Sized> Mutation<R> for &M {
    fn check(&self, current: &R) -> Result<(), String> {
        (**self).check(current)
    }

    fn transform(&self, current: &R) -> R {
        (**self).transform(current)
    }
}

/// One read-check-write cycle of a mutation.
///
/// Lives only for the duration of a single attempt.
#[derive(Debug)]
pub(crate) struct MutationAttempt<R> {
    /// 1-based attempt index.
    pub(crate) index: u32,
    /// Version observed at read time.
    pub(crate) observed_version: u64,
    pub(crate) new_value: R,
}

impl<R> MutationAttempt<R> {
    /// Version the record will carry if this attempt commits.
    pub(crate) fn next_version(&self) -> Option<u64> {
        self.observed_version.checked_add(1)
    }
}
