use super::Mutation;

/// A transform and a boolean precondition, held unboxed.
///
/// Rejections carry a fixed reason since a bare predicate has no description
/// of its own; use [`MutationRequest::when`](super::MutationRequest::when)
/// for named preconditions.
#[derive(Debug, Clone, Copy)]
pub struct FnMutation<F, P> {
    transform: F,
    precondition: P,
}

impl<F, P> FnMutation<F, P> {
    pub fn new(transform: F, precondition: P) -> Self {
        Self {
            transform,
            precondition,
        }
    }
}

impl<R, F, P> Mutation<R> for FnMutation<F, P>
where
    F: Fn(&R) -> R,
    P: Fn(&R) -> bool,
{
    fn check(&self, current: &R) -> Result<(), String> {
        if (self.precondition)(current) {
            Ok(())
        } else {
            Err("precondition not met".to_string())
        }
    }

    fn transform(&self, current: &R) -> R {
        (self.transform)(current)
    }
}
