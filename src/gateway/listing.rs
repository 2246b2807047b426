use async_trait::async_trait;

use crate::error::Result;

/// One page of a cursor-driven object listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Object keys in listing order
    pub keys: Vec<String>,
    /// Cursor for the next page, present when `truncated` is set
    pub next_cursor: Option<String>,
    /// Whether more pages remain
    pub truncated: bool,
}

/// Abstraction for listing objects under a prefix in a durable store
///
/// Implementations must report `truncated = false` on the final page.
#[async_trait]
pub trait ObjectListing: Send + Sync {
    /// Fetch one page of keys, starting at `cursor` when given
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        cursor: Option<&str>,
    ) -> Result<ListingPage>;
}
