use async_trait::async_trait;
use tracing::info;

use crate::dispatch::LaunchRequest;
use crate::error::{MigrationError, Result};

/// Acknowledgment for one accepted launch request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchAck {
    /// ARNs of the tasks the compute substrate started
    pub task_arns: Vec<String>,
}

/// Abstraction over the service that schedules worker processes
///
/// A submission returns once the request is accepted. The dispatcher keeps no
/// handle on the started worker and never waits for it to finish.
#[async_trait]
pub trait LaunchGateway: Send + Sync {
    async fn submit(&self, request: &LaunchRequest) -> Result<LaunchAck>;
}

/// LaunchGateway that prints each request as JSON instead of launching it
#[derive(Debug, Clone, Default)]
pub struct DryRunLaunchGateway;

#[async_trait]
impl LaunchGateway for DryRunLaunchGateway {
    async fn submit(&self, request: &LaunchRequest) -> Result<LaunchAck> {
        let json = serde_json::to_string_pretty(request).map_err(|e| {
            MigrationError::gateway("dry-run", format!("failed to render request: {e}"))
        })?;
        info!("Dry run, not launching: {}", request.describe());
        println!("{json}");
        Ok(LaunchAck::default())
    }
}
