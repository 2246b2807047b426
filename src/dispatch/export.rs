use std::num::NonZeroU32;
use std::sync::Arc;

use tracing::info;

use super::request::LaunchRequest;
use super::{DispatchReport, submit_all};
use crate::config::ExportConfig;
use crate::error::{Result, Stage};
use crate::gateway::LaunchGateway;

/// One segment of a parallel table scan
///
/// Segment `i` of `N` is fixed by the pair alone, so the worker's scan covers
/// the same slice no matter which order the workers start in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentAssignment {
    pub segment: u32,
    pub total_segments: NonZeroU32,
}

impl SegmentAssignment {
    /// Every segment of a scan split `total_segments` ways, in index order
    pub fn all(total_segments: NonZeroU32) -> impl Iterator<Item = SegmentAssignment> {
        (0..total_segments.get()).map(move |segment| SegmentAssignment {
            segment,
            total_segments,
        })
    }
}

/// Starts one export worker per scan segment
pub struct ExportDispatcher {
    launcher: Arc<dyn LaunchGateway>,
}

impl ExportDispatcher {
    pub fn new(launcher: Arc<dyn LaunchGateway>) -> Self {
        Self { launcher }
    }

    /// Build the launch request for every segment without submitting anything
    pub fn plan(config: &ExportConfig) -> Vec<LaunchRequest> {
        SegmentAssignment::all(config.total_segments)
            .map(|assignment| LaunchRequest::for_segment(config, assignment))
            .collect()
    }

    /// Launch `total_segments` export workers, one per segment
    pub async fn dispatch(&self, config: &ExportConfig) -> Result<DispatchReport> {
        info!(
            "{} export tasks will be started for table {}",
            config.total_segments, config.table_name
        );

        let requests = Self::plan(config);
        submit_all(self.launcher.as_ref(), Stage::Export, &requests).await
    }
}
