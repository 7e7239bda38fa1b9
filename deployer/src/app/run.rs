//! Job handler
//!
//! One invocation handles one pipeline job: resolve configuration, fetch the
//! manifest, reconcile the cluster, then report exactly one outcome.

use tokio::time::timeout;
use tracing::{error, info, info_span, Instrument};

use pipeline_api::{Job, JobEvent};

use crate::app::config::DeployConfig;
use crate::app::options::AppOptions;
use crate::app::settings::Settings;
use crate::app::state::AppState;
use crate::deploy::executor::{DeploymentReport, Deployer};
use crate::deploy::manifest::fetch_manifest;
use crate::deploy::outcome::OutcomeReporter;
use crate::errors::DeployError;

/// Handle a job event end to end.
///
/// Reconciliation runs under the configured deadline. Its result is reported
/// to the pipeline; a failure is then returned as this call's error. When the
/// report itself fails, [`DeployError::OutcomeSignalFailed`] is returned.
pub async fn run(
    event: JobEvent,
    state: &AppState,
    settings: &Settings,
    options: &AppOptions,
) -> Result<DeploymentReport, DeployError> {
    let job = event.job;
    let span = info_span!("job", job.id = %job.id);

    async {
        info!("Handling job {} ({} input artifact(s))", job.id, job.data.input_artifacts.len());
        let reporter = OutcomeReporter::new(state.pipeline.clone(), job.id.clone());

        let deadline = settings.deploy_timeout;
        let result = match timeout(deadline, reconcile_job(&job, state, settings, options)).await {
            Ok(result) => result,
            Err(_) => Err(DeployError::Timeout(deadline)),
        };

        match result {
            Ok(report) => {
                reporter.success(Some(report.execution_details(&job.id))).await?;
                Ok(report)
            }
            Err(e) => {
                if let Err(signal) = reporter.failure(&e).await {
                    error!(error.kind = e.kind(), "Job {} failed: {}", job.id, e);
                    return Err(signal);
                }
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}

async fn reconcile_job(
    job: &Job,
    state: &AppState,
    settings: &Settings,
    options: &AppOptions,
) -> Result<DeploymentReport, DeployError> {
    let config = DeployConfig::resolve(settings, options, state.parameters.clone()).await?;
    let manifest = fetch_manifest(state.materializer.clone(), job, &config.manifest_file_name).await?;
    info!(
        "Manifest names {} service(s): {}",
        manifest.len(),
        manifest.service_names().join(", ")
    );

    Deployer::new(state.cluster.clone())
        .deploy(&config.cluster, &manifest)
        .await
}
