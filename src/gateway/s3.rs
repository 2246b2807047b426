use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output;
use std::sync::Arc;

use super::listing::{ListingPage, ObjectListing};
use crate::error::{MigrationError, Result};

/// ObjectListing implementation backed by S3 ListObjectsV2
#[derive(Clone)]
pub struct S3ObjectListing {
    s3_client: Arc<S3Client>,
}

impl S3ObjectListing {
    pub fn new(s3_client: Arc<S3Client>) -> Self {
        Self { s3_client }
    }
}

/// Objects without a key are dropped. A missing truncation flag means the listing is complete.
fn listing_page(response: &ListObjectsV2Output) -> ListingPage {
    let keys = response
        .contents()
        .iter()
        .filter_map(|object| object.key())
        .map(String::from)
        .collect();

    ListingPage {
        keys,
        next_cursor: response.next_continuation_token().map(String::from),
        truncated: response.is_truncated().unwrap_or(false),
    }
}

#[async_trait]
impl ObjectListing for S3ObjectListing {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        cursor: Option<&str>,
    ) -> Result<ListingPage> {
        let response = self
            .s3_client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .set_continuation_token(cursor.map(String::from))
            .send()
            .await
            .map_err(|e| {
                MigrationError::gateway("s3:ListObjectsV2", DisplayErrorContext(&e).to_string())
            })?;

        Ok(listing_page(&response))
    }
}
