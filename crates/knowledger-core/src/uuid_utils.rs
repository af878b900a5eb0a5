//! UUID v7 utilities for time-ordered identifiers.
//!
//! All primary keys use UUIDv7, which embeds a millisecond-precision
//! timestamp in the first 48 bits and therefore sorts in creation order.

use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
///
/// # Example
///
/// ```
/// use knowledger_core::uuid_utils::new_v7;
///
/// let id = new_v7();
/// // IDs generated later will be lexicographically greater
/// ```
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}
