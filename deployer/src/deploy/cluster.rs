//! Cluster state reader

use std::sync::Arc;

use ecs_api::{DescribeServicesRequest, Service, TaskDefinition};
use tracing::debug;

use crate::clients::ClusterApi;
use crate::errors::DeployError;

/// Reads running services and their task definitions from the orchestrator
#[derive(Clone)]
pub struct ClusterStateReader {
    api: Arc<dyn ClusterApi>,
}

impl ClusterStateReader {
    pub fn new(api: Arc<dyn ClusterApi>) -> Self {
        Self { api }
    }

    /// Describe the named services in a single call.
    ///
    /// The result is in orchestrator order and omits services the cluster
    /// does not know.
    pub async fn running_services(
        &self,
        cluster: &str,
        service_names: Vec<String>,
    ) -> Result<Vec<Service>, DeployError> {
        if service_names.is_empty() {
            debug!("No services requested, skipping describe");
            return Ok(Vec::new());
        }

        let response = self
            .api
            .describe_services(DescribeServicesRequest {
                cluster: cluster.to_string(),
                services: service_names,
            })
            .await
            .map_err(|e| DeployError::ClusterQueryFailed(e.to_string()))?;

        for failure in &response.failures {
            debug!(
                "Service not described: {} ({})",
                failure.arn.as_deref().unwrap_or("unknown"),
                failure.reason.as_deref().unwrap_or("no reason")
            );
        }

        if let Some(service) = response.services.iter().find(|s| s.task_definition.is_empty()) {
            return Err(DeployError::ClusterQueryFailed(format!(
                "service {} reports no task definition",
                service.service_name
            )));
        }

        Ok(response.services)
    }

    /// Resolve a task definition by reference
    pub async fn task_definition(&self, reference: &str) -> Result<TaskDefinition, DeployError> {
        self.api
            .describe_task_definition(reference)
            .await
            .map_err(|e| DeployError::ClusterQueryFailed(e.to_string()))
    }
}
