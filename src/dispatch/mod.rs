//! Fan-out of migration work onto disposable workers
//!
//! Both dispatchers turn their units of work into [`LaunchRequest`]s and hand
//! the whole set to [`submit_all`], which issues every submission at once and
//! reports success only when every one of them was accepted.

pub mod discovery;
pub mod export;
pub mod import;
pub mod request;

pub use discovery::ArtifactListing;
pub use export::{ExportDispatcher, SegmentAssignment};
pub use import::{ImportDispatcher, WorkBatch};
pub use request::{EnvVar, LaunchRequest};

use tracing::{info, warn};

use crate::error::{MigrationError, Result, Stage};
use crate::gateway::LaunchGateway;

/// Outcome of a fan-out in which every submission was accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub stage: Stage,
    /// Number of launch requests accepted
    pub launched: usize,
    /// Task ARNs returned by the launch gateway
    pub task_arns: Vec<String>,
}

/// Submit every request concurrently and wait for all of them to settle.
///
/// Fails if any submission failed. Accepted submissions are not rolled back:
/// their workers may already be running when the error is returned.
pub(crate) async fn submit_all(
    launcher: &dyn LaunchGateway,
    stage: Stage,
    requests: &[LaunchRequest],
) -> Result<DispatchReport> {
    if requests.is_empty() {
        return Ok(DispatchReport {
            stage,
            launched: 0,
            task_arns: Vec::new(),
        });
    }

    let total = requests.len();
    info!("Submitting {} {} launch requests", total, stage);

    let results =
        futures::future::join_all(requests.iter().map(|request| launcher.submit(request))).await;

    let mut task_arns = Vec::new();
    let mut failed = 0;
    let mut first_error = None;

    for (request, result) in requests.iter().zip(results) {
        match result {
            Ok(ack) => task_arns.extend(ack.task_arns),
            Err(e) => {
                warn!("Launch for {} failed: {}", request.describe(), e);
                failed += 1;
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    if let Some(source) = first_error {
        warn!(
            "{} of {} {} submissions failed; {} workers were started and keep running",
            failed,
            total,
            stage,
            total - failed
        );
        return Err(MigrationError::Dispatch {
            stage,
            failed,
            total,
            source: Box::new(source),
        });
    }

    info!("All {} {} tasks have been started", total, stage);
    Ok(DispatchReport {
        stage,
        launched: total,
        task_arns,
    })
}
