use async_trait::async_trait;
use aws_sdk_ecs::Client as EcsClient;
use aws_sdk_ecs::error::DisplayErrorContext;
use aws_sdk_ecs::operation::run_task::RunTaskOutput;
use aws_sdk_ecs::types::{
    AssignPublicIp, AwsVpcConfiguration, ContainerOverride, KeyValuePair, LaunchType,
    NetworkConfiguration, TaskOverride,
};
use std::sync::Arc;
use tracing::debug;

use super::launch::{LaunchAck, LaunchGateway};
use crate::config::PublicIp;
use crate::dispatch::LaunchRequest;
use crate::error::{MigrationError, Result};

const RUN_TASK: &str = "ecs:RunTask";

/// LaunchGateway implementation that starts Fargate tasks with ECS RunTask
#[derive(Clone)]
pub struct EcsLaunchGateway {
    ecs_client: Arc<EcsClient>,
}

impl EcsLaunchGateway {
    pub fn new(ecs_client: Arc<EcsClient>) -> Self {
        Self { ecs_client }
    }
}

fn network_configuration(request: &LaunchRequest) -> Result<NetworkConfiguration> {
    let placement = &request.network;
    let assign_public_ip = match placement.public_ip {
        PublicIp::Enabled => AssignPublicIp::Enabled,
        PublicIp::Disabled => AssignPublicIp::Disabled,
    };

    let awsvpc = AwsVpcConfiguration::builder()
        .set_subnets(Some(placement.subnets.clone()))
        .security_groups(&placement.security_group)
        .assign_public_ip(assign_public_ip)
        .build()
        .map_err(|e| MigrationError::gateway(RUN_TASK, e.to_string()))?;

    Ok(NetworkConfiguration::builder()
        .awsvpc_configuration(awsvpc)
        .build())
}

fn task_overrides(request: &LaunchRequest) -> TaskOverride {
    let environment = request
        .environment
        .iter()
        .map(|var| KeyValuePair::builder().name(&var.name).value(&var.value).build())
        .collect();

    TaskOverride::builder()
        .container_overrides(
            ContainerOverride::builder()
                .name(&request.container_name)
                .set_environment(Some(environment))
                .build(),
        )
        .build()
}

/// Interpret a RunTask reply.
///
/// RunTask reports placement problems in the body rather than as an error,
/// so any entry in `failures` fails the submission.
fn launch_ack(request: &LaunchRequest, response: &RunTaskOutput) -> Result<LaunchAck> {
    if let Some(failure) = response.failures().first() {
        return Err(MigrationError::gateway(
            RUN_TASK,
            format!(
                "task for {} was not started: {} {}",
                request.describe(),
                failure.reason().unwrap_or("unknown reason"),
                failure.detail().unwrap_or_default()
            )
            .trim_end()
            .to_string(),
        ));
    }

    let task_arns = response
        .tasks()
        .iter()
        .filter_map(|task| task.task_arn().map(String::from))
        .collect();

    Ok(LaunchAck { task_arns })
}

#[async_trait]
impl LaunchGateway for EcsLaunchGateway {
    async fn submit(&self, request: &LaunchRequest) -> Result<LaunchAck> {
        debug!("Submitting RunTask: {}", request.describe());

        let response = self
            .ecs_client
            .run_task()
            .task_definition(&request.task_definition_arn)
            .cluster(&request.cluster_arn)
            .launch_type(LaunchType::Fargate)
            .network_configuration(network_configuration(request)?)
            .overrides(task_overrides(request))
            .send()
            .await
            .map_err(|e| {
                MigrationError::gateway(RUN_TASK, DisplayErrorContext(&e).to_string())
            })?;

        launch_ack(request, &response)
    }
}
