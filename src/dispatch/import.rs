use std::num::NonZeroUsize;
use std::sync::Arc;

use tracing::{info, warn};

use super::discovery::ArtifactListing;
use super::request::LaunchRequest;
use super::{DispatchReport, submit_all};
use crate::config::{ImportConfig, LIST_DELIMITER};
use crate::error::{Result, Stage};
use crate::gateway::{LaunchGateway, ObjectListing};

/// A group of artifact keys loaded by one import worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkBatch {
    /// Position of the batch in dispatch order
    pub index: usize,
    /// Keys in discovery order; never empty
    pub keys: Vec<String>,
}

impl WorkBatch {
    /// Split the artifact set into consecutive batches of `batch_size` keys.
    ///
    /// Only the last batch may be shorter. Discovery order is kept within and
    /// across batches, and an empty artifact set gives no batches.
    pub fn partition(keys: &[String], batch_size: NonZeroUsize) -> Vec<WorkBatch> {
        keys.chunks(batch_size.get())
            .enumerate()
            .map(|(index, chunk)| WorkBatch {
                index,
                keys: chunk.to_vec(),
            })
            .collect()
    }
}

/// Discovers exported artifacts and starts one import worker per batch of them
pub struct ImportDispatcher {
    listing: Arc<dyn ObjectListing>,
    launcher: Arc<dyn LaunchGateway>,
}

impl ImportDispatcher {
    pub fn new(listing: Arc<dyn ObjectListing>, launcher: Arc<dyn LaunchGateway>) -> Self {
        Self { listing, launcher }
    }

    /// List every artifact under the configured prefix, in listing order
    pub async fn discover(&self, config: &ImportConfig) -> Result<Vec<String>> {
        let keys = ArtifactListing::new(
            Arc::clone(&self.listing),
            &config.bucket_name,
            &config.prefix,
        )
        .collect()
        .await?;

        info!(
            "Found {} keys in s3://{}/{}",
            keys.len(),
            config.bucket_name,
            config.prefix
        );
        Ok(keys)
    }

    /// Build the launch request for every batch without submitting anything.
    ///
    /// Every key is dispatched. A key containing the list delimiter is still
    /// sent, but the worker will split it, so it is reported with `warn!`.
    pub fn plan(config: &ImportConfig, keys: &[String]) -> Vec<LaunchRequest> {
        for key in keys.iter().filter(|key| key.contains(LIST_DELIMITER)) {
            warn!(
                "Artifact key '{}' contains '{}' and will be split by the import worker",
                key, LIST_DELIMITER
            );
        }

        WorkBatch::partition(keys, config.batch_size)
            .iter()
            .map(|batch| LaunchRequest::for_batch(config, batch))
            .collect()
    }

    /// Discover the artifact set, batch it, and launch one import worker per batch
    pub async fn dispatch(&self, config: &ImportConfig) -> Result<DispatchReport> {
        let keys = self.discover(config).await?;
        let requests = Self::plan(config, &keys);

        if requests.is_empty() {
            info!("No artifacts to import, no tasks started");
        } else {
            info!(
                "{} import tasks will be started ({} keys per task)",
                requests.len(),
                config.batch_size
            );
        }

        submit_all(self.launcher.as_ref(), Stage::Import, &requests).await
    }
}
