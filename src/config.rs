//! Configuration for the migration dispatchers
//!
//! This module centralizes the environment contract shared with the workers and
//! the validated configuration each dispatcher is invoked with. Configuration is
//! read once per invocation and validated in full before any gateway is touched.

use std::num::{NonZeroU32, NonZeroUsize};

use derive_builder::Builder;
use serde::Serialize;

use crate::error::{MigrationError, Result};

// ============================================================================
// Dispatcher Environment
// ============================================================================

pub const TASK_DEFINITION_ARN: &str = "TASK_DEFINITION_ARN";
pub const CONTAINER_NAME: &str = "CONTAINER_NAME";
pub const CLUSTER_ARN: &str = "CLUSTER_ARN";
pub const SUBNETS: &str = "SUBNETS";
pub const SECURITY_GROUP: &str = "SECURITY_GROUP";
pub const ASSIGN_PUBLIC_IP: &str = "ASSIGN_PUBLIC_IP";
pub const BUCKET_NAME: &str = "BUCKET_NAME";
pub const S3_PREFIX: &str = "S3_PREFIX";
pub const TABLE_NAME: &str = "TABLE_NAME";
pub const REGION: &str = "REGION";
pub const TOTAL_SEGMENTS: &str = "TOTAL_SEGMENTS";
pub const BATCH_SIZE: &str = "BATCH_SIZE";

// ============================================================================
// Worker Environment
// ============================================================================

/// Segment index handed to an export worker
pub const SEGMENT: &str = "SEGMENT";

/// Delimited artifact key list handed to an import worker
pub const S3_KEYS: &str = "S3_KEYS";

/// Separator used for `SUBNETS` and `S3_KEYS`
pub const LIST_DELIMITER: &str = ",";

// ============================================================================
// Import Batching
// ============================================================================

/// Number of artifacts handed to each import worker
///
/// Each export artifact holds up to 10,000 items, so three artifacts keep a
/// single Fargate task's write volume around 30,000 items.
pub const DEFAULT_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(3) {
    Some(size) => size,
    None => panic!("batch size must be non-zero"),
};

/// Whether launched tasks receive a public IP
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PublicIp {
    #[default]
    Enabled,
    Disabled,
}

impl PublicIp {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "ENABLED" => Ok(PublicIp::Enabled),
            "DISABLED" => Ok(PublicIp::Disabled),
            _ => Err(MigrationError::Configuration(format!(
                "{ASSIGN_PUBLIC_IP} must be ENABLED or DISABLED, got '{s}'"
            ))),
        }
    }
}

/// Where launched tasks are placed on the network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct NetworkPlacement {
    pub subnets: Vec<String>,
    #[builder(setter(into))]
    pub security_group: String,
    #[builder(default)]
    pub public_ip: PublicIp,
}

impl NetworkPlacementBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if matches!(&self.subnets, Some(subnets) if subnets.is_empty()) {
            return Err("at least one subnet is required".to_string());
        }
        Ok(())
    }
}

/// The ECS task template and the cluster it runs on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Builder)]
pub struct ClusterTarget {
    #[builder(setter(into))]
    pub task_definition_arn: String,
    #[builder(setter(into))]
    pub container_name: String,
    #[builder(setter(into))]
    pub cluster_arn: String,
    pub network: NetworkPlacement,
}

impl ClusterTarget {
    fn read<F>(env: &mut EnvReader<F>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let task_definition_arn = env.required(TASK_DEFINITION_ARN);
        let container_name = env.required(CONTAINER_NAME);
        let cluster_arn = env.required(CLUSTER_ARN);
        let subnets = env.required(SUBNETS);
        let security_group = env.required(SECURITY_GROUP);

        let subnets: Vec<String> = subnets
            .split(LIST_DELIMITER)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if subnets.is_empty() && !env.is_missing(SUBNETS) {
            env.invalid(format!("{SUBNETS} must list at least one subnet"));
        }

        let public_ip = match env.optional(ASSIGN_PUBLIC_IP) {
            Some(raw) => PublicIp::parse(&raw).unwrap_or_else(|e| {
                env.invalid(e.to_string());
                PublicIp::default()
            }),
            None => PublicIp::default(),
        };

        Self {
            task_definition_arn,
            container_name,
            cluster_arn,
            network: NetworkPlacement {
                subnets,
                security_group,
                public_ip,
            },
        }
    }
}

/// Configuration for one export dispatch
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct ExportConfig {
    pub target: ClusterTarget,
    #[builder(setter(into))]
    pub bucket_name: String,
    #[builder(setter(into))]
    pub table_name: String,
    #[builder(setter(into))]
    pub region: String,
    pub total_segments: NonZeroU32,
}

impl ExportConfig {
    /// Read the export configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the export configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut env = EnvReader::new(lookup);

        let target = ClusterTarget::read(&mut env);
        let bucket_name = env.required(BUCKET_NAME);
        let table_name = env.required(TABLE_NAME);
        let region = env.required(REGION);
        let total_segments = env.required(TOTAL_SEGMENTS);

        let total_segments = if env.is_missing(TOTAL_SEGMENTS) {
            NonZeroU32::MIN
        } else {
            match total_segments.trim().parse::<NonZeroU32>() {
                Ok(n) => n,
                Err(_) => {
                    env.invalid(format!(
                        "{TOTAL_SEGMENTS} must be a positive integer, got '{total_segments}'"
                    ));
                    NonZeroU32::MIN
                }
            }
        };

        env.finish()?;

        Ok(Self {
            target,
            bucket_name,
            table_name,
            region,
            total_segments,
        })
    }
}

/// Configuration for one import dispatch
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct ImportConfig {
    pub target: ClusterTarget,
    #[builder(setter(into))]
    pub bucket_name: String,
    #[builder(setter(into))]
    pub prefix: String,
    #[builder(setter(into))]
    pub table_name: String,
    #[builder(setter(into))]
    pub region: String,
    #[builder(default = "DEFAULT_BATCH_SIZE")]
    pub batch_size: NonZeroUsize,
}

impl ImportConfig {
    /// Read the import configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the import configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut env = EnvReader::new(lookup);

        let target = ClusterTarget::read(&mut env);
        let bucket_name = env.required(BUCKET_NAME);
        let prefix = env.required(S3_PREFIX);
        let table_name = env.required(TABLE_NAME);
        let region = env.required(REGION);

        let batch_size = match env.optional(BATCH_SIZE) {
            Some(raw) => raw.trim().parse::<NonZeroUsize>().unwrap_or_else(|_| {
                env.invalid(format!(
                    "{BATCH_SIZE} must be a positive integer, got '{raw}'"
                ));
                DEFAULT_BATCH_SIZE
            }),
            None => DEFAULT_BATCH_SIZE,
        };

        env.finish()?;

        Ok(Self {
            target,
            bucket_name,
            prefix,
            table_name,
            region,
            batch_size,
        })
    }
}

/// Collects every missing or malformed variable so they are reported together
struct EnvReader<F> {
    lookup: F,
    missing: Vec<&'static str>,
    invalid: Vec<String>,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn new(lookup: F) -> Self {
        Self {
            lookup,
            missing: Vec::new(),
            invalid: Vec::new(),
        }
    }

    fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.trim().is_empty())
    }

    fn required(&mut self, name: &'static str) -> String {
        match self.optional(name) {
            Some(value) => value,
            None => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    fn is_missing(&self, name: &str) -> bool {
        self.missing.iter().any(|missing| *missing == name)
    }

    fn invalid(&mut self, message: String) {
        self.invalid.push(message);
    }

    fn finish(self) -> Result<()> {
        let mut problems = Vec::new();
        if !self.missing.is_empty() {
            problems.push(format!(
                "missing required environment variables: {}",
                self.missing.join(", ")
            ));
        }
        problems.extend(self.invalid);

        if problems.is_empty() {
            Ok(())
        } else {
            Err(MigrationError::Configuration(problems.join("; ")))
        }
    }
}
