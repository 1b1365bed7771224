//! Page manifest decoding
//!
//! A page of the feed is a JSON array of `{ "id": ..., "url": ... }` objects.
//! Any other fields the feed sends (width, height, breeds, ...) are ignored.

use serde::Deserialize;

/// One item listed on a page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemRecord {
    /// Opaque identifier, used as the file name stem
    pub id: String,

    /// Where the item content is fetched from
    ///
    /// Kept as the raw string; it is parsed when the item is fetched, so one
    /// unusable URL fails only its own item.
    pub url: String,
}

/// Decodes a page body into its ordered item records
///
/// A body that is not an array of records fails as a whole, as does an entry
/// missing its `id` or `url`.
pub fn decode_manifest(body: &[u8]) -> Result<Vec<ItemRecord>, serde_json::Error> {
    serde_json::from_slice(body)
}
