//! Records - typed, versioned values held by a record store.
//!
//! A record is any serde-serializable type that names its collection and
//! exposes a unique id. Stores hand records back wrapped in [`Versioned`],
//! carrying the version counter used for optimistic concurrency.
//!
//! ## Example
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use versioned_mutation::Record;
//!
//! #[derive(Clone, Serialize, Deserialize, Record)]
//! #[record(collection = "stock_items")]
//! struct StockItem {
//!     #[record(id)]
//!     sku: String,
//!     quantity: u64,
//! }
//!
//! assert_eq!(StockItem::COLLECTION, "stock_items");
//! ```
//!
//! A misspelled key is a compile error rather than a silent default:
//! ```compile_fail
//! use serde::{Deserialize, Serialize};
//! use versioned_mutation::Record;
//!
//! #[derive(Clone, Serialize, Deserialize, Record)]
//! #[record(colection = "stock_items")]
//! struct StockItem {
//!     id: String,
//! }
//! ```
//!
//! So is any key besides `collection`:
//! ```compile_fail
//! use serde::{Deserialize, Serialize};
//! use versioned_mutation::Record;
//!
//! #[derive(Clone, Serialize, Deserialize, Record)]
//! #[record(collection = "stock_items", shard = 3)]
//! struct StockItem {
//!     id: String,
//! }
//! ```

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Trait for types that can be held in a record store.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// The collection this record type lives in.
    /// Maps to a table in SQL, a collection in a document store, a key prefix in KV stores, etc.
    const COLLECTION: &'static str;

    /// Returns the unique identifier of this record within its collection.
    fn id(&self) -> &str;
}

/// A record value together with its stored version.
///
/// The version starts at 1 when a record is inserted and grows by exactly one
/// on every successful conditional update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub data: T,
    pub version: u64,
}

impl<T> Versioned<T> {
    pub fn new(data: T, version: u64) -> Self {
        Self { data, version }
    }

    /// Map the data while keeping the version.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Versioned<U> {
        Versioned {
            data: f(self.data),
            version: self.version,
        }
    }
}
