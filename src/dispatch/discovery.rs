//! Discovery of the artifacts written by the export stage

use async_stream::try_stream;
use futures::{Stream, TryStreamExt};
use std::sync::Arc;
use tracing::debug;

use crate::error::{MigrationError, Result};
use crate::gateway::ObjectListing;

/// Every artifact key under one bucket prefix
///
/// [`keys`](Self::keys) walks the listing page by page, following the
/// continuation cursor. Each call starts a fresh walk from the first page.
#[derive(Clone)]
pub struct ArtifactListing {
    listing: Arc<dyn ObjectListing>,
    bucket: String,
    prefix: String,
}

impl ArtifactListing {
    pub fn new(
        listing: Arc<dyn ObjectListing>,
        bucket: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            listing,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    /// Lazily yield artifact keys in listing order.
    ///
    /// Pages are requested one at a time since each request needs the cursor
    /// returned by the one before it. Empty keys are skipped.
    pub fn keys(&self) -> impl Stream<Item = Result<String>> + '_ {
        try_stream! {
            let mut cursor: Option<String> = None;
            let mut page_number = 0usize;

            loop {
                let page = self
                    .listing
                    .list_page(&self.bucket, &self.prefix, cursor.as_deref())
                    .await?;
                page_number += 1;
                debug!(
                    "Listing page {} under s3://{}/{}: {} keys",
                    page_number,
                    self.bucket,
                    self.prefix,
                    page.keys.len()
                );

                for key in page.keys {
                    if !key.is_empty() {
                        yield key;
                    }
                }

                if !page.truncated {
                    break;
                }

                match page.next_cursor {
                    Some(next) => cursor = Some(next),
                    None => Err::<(), _>(MigrationError::gateway(
                        "s3:ListObjectsV2",
                        format!(
                            "page {} of s3://{}/{} is truncated but carries no continuation token",
                            page_number, self.bucket, self.prefix
                        ),
                    ))?,
                }
            }
        }
    }

    /// Drain the listing into the full, ordered artifact set
    pub async fn collect(&self) -> Result<Vec<String>> {
        self.keys().try_collect().await
    }
}
