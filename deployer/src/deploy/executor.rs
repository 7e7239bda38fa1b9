//! Deployment executor
//!
//! Drives one reconciliation run: describe the services the manifest names,
//! plan a candidate task definition for each one the cluster knows, then roll
//! the candidates out one service at a time in the order the cluster returned
//! the services.

use std::sync::Arc;

use ecs_api::{RegisterTaskDefinitionRequest, Service};
use pipeline_api::ExecutionDetails;
use serde::Serialize;
use tracing::{debug, info};

use crate::clients::ClusterApi;
use crate::deploy::cluster::ClusterStateReader;
use crate::deploy::reconcile::reconcile;
use crate::deploy::rollout::{RolloutDriver, ServiceRollout};
use crate::errors::DeployError;
use crate::models::manifest::ServiceManifest;

/// A running service paired with the definition it should run next
#[derive(Debug, Clone)]
pub struct ServicePlan {
    pub service: Service,
    pub candidate: RegisterTaskDefinitionRequest,
}

/// Result of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeploymentReport {
    /// Services moved to a new revision, in rollout order
    pub updated: Vec<ServiceRollout>,

    /// Running services the manifest did not name
    pub skipped: Vec<String>,
}

impl DeploymentReport {
    /// Execution details to attach to the job's success result
    pub fn execution_details(&self, job_id: &str) -> ExecutionDetails {
        let summary = if self.updated.is_empty() {
            "No services updated".to_string()
        } else {
            let services: Vec<String> = self
                .updated
                .iter()
                .map(|rollout| format!("{} -> {}", rollout.service_name, rollout.task_definition_arn))
                .collect();
            format!("Updated {} service(s): {}", self.updated.len(), services.join(", "))
        };

        ExecutionDetails {
            summary: Some(summary),
            external_execution_id: Some(job_id.to_string()),
            percent_complete: Some(100),
        }
    }
}

/// Reconciles a manifest against a cluster
#[derive(Clone)]
pub struct Deployer {
    reader: ClusterStateReader,
    driver: RolloutDriver,
}

impl Deployer {
    pub fn new(cluster_api: Arc<dyn ClusterApi>) -> Self {
        Self {
            reader: ClusterStateReader::new(cluster_api.clone()),
            driver: RolloutDriver::new(cluster_api),
        }
    }

    /// Compute candidates for every running service the manifest names.
    ///
    /// No registration or update is issued here, so a container mismatch in
    /// any service aborts the run before the cluster is touched.
    pub async fn plan(
        &self,
        cluster: &str,
        manifest: &ServiceManifest,
    ) -> Result<(Vec<ServicePlan>, Vec<String>), DeployError> {
        let services = self
            .reader
            .running_services(cluster, manifest.service_names())
            .await?;
        debug!("Cluster {} returned {} service(s)", cluster, services.len());

        let mut plans = Vec::new();
        let mut skipped = Vec::new();

        for service in services {
            let Some(request) = manifest.find(&service.service_name) else {
                debug!("Service {} not in manifest, skipping", service.service_name);
                skipped.push(service.service_name);
                continue;
            };

            let current = self.reader.task_definition(&service.task_definition).await?;
            let candidate = reconcile(request, &current)?;
            plans.push(ServicePlan { service, candidate });
        }

        Ok((plans, skipped))
    }

    /// Plan and roll out; the first failure aborts the remaining services
    pub async fn deploy(
        &self,
        cluster: &str,
        manifest: &ServiceManifest,
    ) -> Result<DeploymentReport, DeployError> {
        let (plans, skipped) = self.plan(cluster, manifest).await?;

        let mut report = DeploymentReport {
            updated: Vec::with_capacity(plans.len()),
            skipped,
        };

        for plan in plans {
            let rollout = self.driver.roll_out(&plan.service, plan.candidate).await?;
            report.updated.push(rollout);
        }

        info!(
            "Deployment finished: {} updated, {} skipped",
            report.updated.len(),
            report.skipped.len()
        );
        Ok(report)
    }
}
