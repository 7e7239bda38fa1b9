//! Rollout driver

use std::sync::Arc;

use ecs_api::{RegisterTaskDefinitionRequest, Service, UpdateServiceRequest};
use serde::Serialize;
use tracing::info;

use crate::clients::ClusterApi;
use crate::errors::DeployError;

/// A service pointed at a freshly registered revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceRollout {
    pub service_name: String,
    pub cluster_arn: String,
    pub task_definition_arn: String,
}

/// Registers candidate definitions and updates services to use them
#[derive(Clone)]
pub struct RolloutDriver {
    api: Arc<dyn ClusterApi>,
}

impl RolloutDriver {
    pub fn new(api: Arc<dyn ClusterApi>) -> Self {
        Self { api }
    }

    /// Register `candidate` as a new revision and point `service` at it.
    ///
    /// The service's observed deployment settings are sent back unchanged.
    pub async fn roll_out(
        &self,
        service: &Service,
        candidate: RegisterTaskDefinitionRequest,
    ) -> Result<ServiceRollout, DeployError> {
        let family = candidate.family.clone();
        let registered = self
            .api
            .register_task_definition(candidate)
            .await
            .map_err(|e| DeployError::RegistrationFailed(e.to_string()))?;

        let task_definition_arn = registered.task_definition_arn.ok_or_else(|| {
            DeployError::RegistrationFailed(format!("no ARN returned for family {}", family))
        })?;
        info!(
            "Registered {} revision {} for service {}",
            family,
            registered.revision.unwrap_or_default(),
            service.service_name
        );

        self.api
            .update_service(UpdateServiceRequest {
                cluster: service.cluster_arn.clone(),
                service: service.service_name.clone(),
                task_definition: task_definition_arn.clone(),
                deployment: service.deployment.clone(),
            })
            .await
            .map_err(|e| DeployError::ServiceUpdateFailed(e.to_string()))?;
        info!("Updated service {} to {}", service.service_name, task_definition_arn);

        Ok(ServiceRollout {
            service_name: service.service_name.clone(),
            cluster_arn: service.cluster_arn.clone(),
            task_definition_arn,
        })
    }
}
