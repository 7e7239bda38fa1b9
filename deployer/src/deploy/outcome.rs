//! Job outcome reporting

use std::sync::Arc;

use pipeline_api::{
    ExecutionDetails, FailureDetails, PutJobFailureResultRequest, PutJobSuccessResultRequest,
};
use tracing::{error, info};

use crate::clients::PipelineApi;
use crate::errors::DeployError;

/// Signals the terminal result of a job back to the pipeline
#[derive(Clone)]
pub struct OutcomeReporter {
    api: Arc<dyn PipelineApi>,
    job_id: String,
}

impl OutcomeReporter {
    pub fn new(api: Arc<dyn PipelineApi>, job_id: impl Into<String>) -> Self {
        Self {
            api,
            job_id: job_id.into(),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Acknowledge the job as succeeded
    pub async fn success(&self, details: Option<ExecutionDetails>) -> Result<(), DeployError> {
        info!("Reporting success for job {}", self.job_id);
        self.api
            .put_job_success(PutJobSuccessResultRequest {
                job_id: self.job_id.clone(),
                execution_details: details,
            })
            .await
            .map_err(|e| DeployError::OutcomeSignalFailed(e.to_string()))
    }

    /// Report the job as failed with the message of `cause`
    pub async fn failure(&self, cause: &DeployError) -> Result<(), DeployError> {
        error!(error.kind = cause.kind(), "Reporting failure for job {}: {}", self.job_id, cause);
        self.api
            .put_job_failure(PutJobFailureResultRequest {
                job_id: self.job_id.clone(),
                failure_details: FailureDetails::job_failed(cause.to_string()),
            })
            .await
            .map_err(|e| DeployError::OutcomeSignalFailed(e.to_string()))
    }
}
