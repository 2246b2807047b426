use serde::Serialize;

use crate::config::{
    BUCKET_NAME, ClusterTarget, ExportConfig, ImportConfig, LIST_DELIMITER, NetworkPlacement,
    REGION, S3_KEYS, SEGMENT, TABLE_NAME, TOTAL_SEGMENTS,
};

use super::export::SegmentAssignment;
use super::import::WorkBatch;

/// One environment override handed to the worker container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

impl EnvVar {
    fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

/// A request to start one worker for one unit of work
///
/// Built by a dispatcher, handed to the launch gateway, then dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchRequest {
    pub task_definition_arn: String,
    pub cluster_arn: String,
    pub container_name: String,
    pub network: NetworkPlacement,
    /// Overrides in the order the worker contract lists them
    pub environment: Vec<EnvVar>,
}

impl LaunchRequest {
    fn new(target: &ClusterTarget, environment: Vec<EnvVar>) -> Self {
        Self {
            task_definition_arn: target.task_definition_arn.clone(),
            cluster_arn: target.cluster_arn.clone(),
            container_name: target.container_name.clone(),
            network: target.network.clone(),
            environment,
        }
    }

    /// Request for the export worker that scans `assignment`
    pub fn for_segment(config: &ExportConfig, assignment: SegmentAssignment) -> Self {
        Self::new(
            &config.target,
            vec![
                EnvVar::new(BUCKET_NAME, &config.bucket_name),
                EnvVar::new(TABLE_NAME, &config.table_name),
                EnvVar::new(REGION, &config.region),
                EnvVar::new(TOTAL_SEGMENTS, assignment.total_segments.to_string()),
                EnvVar::new(SEGMENT, assignment.segment.to_string()),
            ],
        )
    }

    /// Request for the import worker that loads `batch`
    pub fn for_batch(config: &ImportConfig, batch: &WorkBatch) -> Self {
        Self::new(
            &config.target,
            vec![
                EnvVar::new(S3_KEYS, batch.keys.join(LIST_DELIMITER)),
                EnvVar::new(BUCKET_NAME, &config.bucket_name),
                EnvVar::new(TABLE_NAME, &config.table_name),
                EnvVar::new(REGION, &config.region),
            ],
        )
    }

    /// Value of an environment override, if set
    pub fn env(&self, name: &str) -> Option<&str> {
        self.environment
            .iter()
            .find(|var| var.name == name)
            .map(|var| var.value.as_str())
    }

    /// Short label for logs, naming the unit of work
    pub fn describe(&self) -> String {
        if let Some(segment) = self.env(SEGMENT) {
            format!(
                "segment {}/{}",
                segment,
                self.env(TOTAL_SEGMENTS).unwrap_or("?")
            )
        } else if let Some(keys) = self.env(S3_KEYS) {
            format!("batch [{}]", keys)
        } else {
            self.task_definition_arn.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        ClusterTargetBuilder, ExportConfigBuilder, ImportConfigBuilder, NetworkPlacementBuilder,
        PublicIp,
    };
    use std::num::NonZeroU32;

    fn target() -> ClusterTarget {
        ClusterTargetBuilder::default()
            .task_definition_arn("arn:task/export:3")
            .container_name("worker")
            .cluster_arn("arn:cluster/migration")
            .network(
                NetworkPlacementBuilder::default()
                    .subnets(vec!["subnet-a".to_string()])
                    .security_group("sg-1")
                    .public_ip(PublicIp::Disabled)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_segment_request_environment() {
        let config = ExportConfigBuilder::default()
            .target(target())
            .bucket_name("bucket")
            .table_name("orders")
            .region("eu-west-1")
            .total_segments(NonZeroU32::new(8).unwrap())
            .build()
            .unwrap();

        let request = LaunchRequest::for_segment(
            &config,
            SegmentAssignment {
                segment: 5,
                total_segments: config.total_segments,
            },
        );

        let names: Vec<&str> = request.environment.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(
            names,
            vec![BUCKET_NAME, TABLE_NAME, REGION, TOTAL_SEGMENTS, SEGMENT]
        );
        assert_eq!(request.env(SEGMENT), Some("5"));
        assert_eq!(request.env(TOTAL_SEGMENTS), Some("8"));
        assert_eq!(request.env(TABLE_NAME), Some("orders"));
        assert_eq!(request.container_name, "worker");
        assert_eq!(request.network.public_ip, PublicIp::Disabled);
        assert_eq!(request.describe(), "segment 5/8");
    }

    #[test]
    fn test_batch_request_joins_keys() {
        let config = ImportConfigBuilder::default()
            .target(target())
            .bucket_name("bucket")
            .prefix("dump/")
            .table_name("orders-copy")
            .region("eu-west-1")
            .build()
            .unwrap();

        let batch = WorkBatch {
            index: 0,
            keys: vec!["dump/a.json".to_string(), "dump/b.json".to_string()],
        };
        let request = LaunchRequest::for_batch(&config, &batch);

        assert_eq!(request.env(S3_KEYS), Some("dump/a.json,dump/b.json"));
        assert_eq!(request.env(TABLE_NAME), Some("orders-copy"));
        assert_eq!(request.env(SEGMENT), None);
        assert_eq!(request.environment[0].name, S3_KEYS);
    }

    #[test]
    fn test_request_serializes_for_dry_run() {
        let config = ExportConfigBuilder::default()
            .target(target())
            .bucket_name("bucket")
            .table_name("orders")
            .region("eu-west-1")
            .total_segments(NonZeroU32::new(1).unwrap())
            .build()
            .unwrap();
        let request = LaunchRequest::for_segment(
            &config,
            SegmentAssignment {
                segment: 0,
                total_segments: config.total_segments,
            },
        );

        let json: serde_json::Value = serde_json::to_value(&request).unwrap();
        assert_eq!(json["network"]["public_ip"], "DISABLED");
        assert_eq!(json["environment"][4]["name"], "SEGMENT");
        assert_eq!(json["environment"][4]["value"], "0");
    }
}
