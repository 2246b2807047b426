//! High-level runner API for the migration dispatchers.
//!
//! Each entry point performs exactly one dispatch: it sets up the AWS clients,
//! runs the dispatcher once, and returns. Nothing is retained between runs and
//! no worker is tracked after it has been launched.

use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::config::{ExportConfig, ImportConfig};
use crate::dispatch::{DispatchReport, ExportDispatcher, ImportDispatcher};
use crate::error::Result;
use crate::gateway::{DryRunLaunchGateway, EcsLaunchGateway, LaunchGateway, S3ObjectListing};

/// Options that apply to a single dispatch run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Print the launch requests instead of starting tasks
    pub dry_run: bool,
}

/// Load SDK configuration, preferring the ambient region and falling back to `region`
async fn load_aws_config(region: &str) -> SdkConfig {
    let region_provider =
        RegionProviderChain::default_provider().or_else(Region::new(region.to_string()));

    aws_config::defaults(BehaviorVersion::latest())
        .region(region_provider)
        .load()
        .await
}

fn launcher(aws_config: &SdkConfig, options: RunOptions) -> Arc<dyn LaunchGateway> {
    if options.dry_run {
        Arc::new(DryRunLaunchGateway)
    } else {
        Arc::new(EcsLaunchGateway::new(Arc::new(aws_sdk_ecs::Client::new(
            aws_config,
        ))))
    }
}

/// Start one export worker per scan segment
///
/// # Example
///
/// ```no_run
/// use dynamodb_migration::config::ExportConfig;
/// use dynamodb_migration::runner::{RunOptions, run_export};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = ExportConfig::from_env()?;
/// let report = run_export(config, RunOptions::default()).await?;
/// println!("Started {} export tasks", report.launched);
/// # Ok(())
/// # }
/// ```
pub async fn run_export(config: ExportConfig, options: RunOptions) -> Result<DispatchReport> {
    let invocation_id = Uuid::new_v4();
    info!(
        "Starting export dispatch {} for table {}",
        invocation_id, config.table_name
    );

    let aws_config = load_aws_config(&config.region).await;
    let dispatcher = ExportDispatcher::new(launcher(&aws_config, options));

    dispatcher.dispatch(&config).await
}

/// Discover exported artifacts and start one import worker per batch
pub async fn run_import(config: ImportConfig, options: RunOptions) -> Result<DispatchReport> {
    let invocation_id = Uuid::new_v4();
    info!(
        "Starting import dispatch {} from s3://{}/{} into table {}",
        invocation_id, config.bucket_name, config.prefix, config.table_name
    );

    let aws_config = load_aws_config(&config.region).await;
    let listing = Arc::new(S3ObjectListing::new(Arc::new(aws_sdk_s3::Client::new(
        &aws_config,
    ))));
    let dispatcher = ImportDispatcher::new(listing, launcher(&aws_config, options));

    dispatcher.dispatch(&config).await
}
