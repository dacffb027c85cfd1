mod record;

use proc_macro::TokenStream;

// ============================================================================
// #[derive(Record)]
// ============================================================================

/// Derive macro implementing `versioned_mutation::Record`.
///
/// The collection name comes from `#[record(collection = "...")]` on the
/// struct, defaulting to the snake_case struct name plus `s`. The id field is
/// the one marked `#[record(id)]`, or a field named `id`.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, Record)]
/// #[record(collection = "stock_items")]
/// pub struct StockItem {
///     #[record(id)]
///     pub sku: String,
///     pub quantity: u64,
/// }
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input)
}
