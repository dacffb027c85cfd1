use std::fmt;

/// Error type for record store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A lock guarding the storage was poisoned (a writer panicked while holding it).
    Poisoned(String),
    /// Payload encoding or decoding failed.
    Codec(String),
    /// The store could not be reached or timed out. Worth retrying later.
    Unavailable(String),
    /// The store refused the operation.
    Rejected(String),
}

impl StoreError {
    /// Whether a caller may reasonably retry the whole operation later.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Poisoned(operation) => {
                write!(f, "store lock poisoned during {}", operation)
            }
            StoreError::Codec(msg) => write!(f, "record codec error: {}", msg),
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
            StoreError::Rejected(msg) => write!(f, "store rejected operation: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<bitcode::Error> for StoreError {
    fn from(err: bitcode::Error) -> Self {
        StoreError::Codec(err.to_string())
    }
}
