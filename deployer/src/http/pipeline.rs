//! Pipeline API client

use async_trait::async_trait;
use pipeline_api::{PutJobFailureResultRequest, PutJobSuccessResultRequest};

use crate::clients::PipelineApi;
use crate::errors::DeployError;
use crate::http::client::HttpClient;

/// Target prefix of the pipeline JSON protocol
pub const PIPELINE_TARGET_PREFIX: &str = "CodePipeline_20150709";

/// Pipeline client over HTTP
#[derive(Debug, Clone)]
pub struct PipelineClient {
    http: HttpClient,
}

impl PipelineClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl PipelineApi for PipelineClient {
    async fn put_job_success(&self, request: PutJobSuccessResultRequest) -> Result<(), DeployError> {
        self.http.call_unit("PutJobSuccessResult", &request).await
    }

    async fn put_job_failure(&self, request: PutJobFailureResultRequest) -> Result<(), DeployError> {
        self.http.call_unit("PutJobFailureResult", &request).await
    }
}
