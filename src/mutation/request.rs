use std::fmt;

use super::Mutation;

type Transform<'a, R> = Box<dyn Fn(&R) -> R + Send + Sync + 'a>;
type Predicate<'a, R> = Box<dyn Fn(&R) -> bool + Send + Sync + 'a>;

struct Precondition<'a, R> {
    description: String,
    predicate: Predicate<'a, R>,
}

/// Closure-backed mutation.
///
/// The closures may borrow from the caller for `'a`.
///
/// ```ignore
/// let reserve = MutationRequest::new(|item: &StockItem| StockItem {
///     quantity: item.quantity - 10,
///     ..item.clone()
/// })
/// .when("insufficient quantity", |item| item.quantity >= 10);
/// ```
pub struct MutationRequest<'a, R> {
    transform: Transform<'a, R>,
    preconditions: Vec<Precondition<'a, R>>,
}

impl<'a, R> MutationRequest<'a, R> {
    /// Create an unconditional mutation.
    pub fn new<F>(transform: F) -> Self
    where
        F: Fn(&R) -> R + Send + Sync + 'a,
    {
        Self {
            transform: Box::new(transform),
            preconditions: Vec::new(),
        }
    }

    /// Add a precondition. `description` is reported when the predicate
    /// returns false. Preconditions are evaluated in the order added.
    pub fn when<P>(mut self, description: impl Into<String>, predicate: P) -> Self
    where
        P: Fn(&R) -> bool + Send + Sync + 'a,
    {
        self.preconditions.push(Precondition {
            description: description.into(),
            predicate: Box::new(predicate),
        });
        self
    }
}

impl<R> Mutation<R> for MutationRequest<'_, R> {
    fn check(&self, current: &R) -> Result<(), String> {
        match self
            .preconditions
            .iter()
            .find(|precondition| !(precondition.predicate)(current))
        {
            Some(failed) => Err(failed.description.clone()),
            None => Ok(()),
        }
    }

    fn transform(&self, current: &R) -> R {
        (self.transform)(current)
    }
}

impl<R> fmt::Debug for MutationRequest<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let descriptions: Vec<&str> = self
            .preconditions
            .iter()
            .map(|p| p.description.as_str())
            .collect();
        f.debug_struct("MutationRequest")
            .field("preconditions", &descriptions)
            .finish_non_exhaustive()
    }
}
