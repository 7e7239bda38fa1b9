//! Application state management

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::app::options::AppOptions;
use crate::app::settings::Settings;
use crate::artifacts::{HttpMaterializer, LocalMaterializer};
use crate::clients::{ArtifactMaterializer, ClusterApi, ParameterStore, PipelineApi};
use crate::errors::DeployError;
use crate::http::client::HttpClient;
use crate::http::cluster::{EcsClient, ECS_TARGET_PREFIX};
use crate::http::parameters::{SsmClient, SSM_TARGET_PREFIX};
use crate::http::pipeline::{PipelineClient, PIPELINE_TARGET_PREFIX};

/// Collaborators of one invocation
#[derive(Clone)]
pub struct AppState {
    pub cluster: Arc<dyn ClusterApi>,
    pub pipeline: Arc<dyn PipelineApi>,
    pub parameters: Arc<dyn ParameterStore>,
    pub materializer: Arc<dyn ArtifactMaterializer>,
}

impl AppState {
    /// Build HTTP collaborators for the configured endpoints.
    ///
    /// With `artifacts_dir` set, artifacts are read from that directory
    /// instead of the object store.
    pub fn from_settings(
        settings: &Settings,
        options: &AppOptions,
        artifacts_dir: Option<PathBuf>,
    ) -> Result<Self, DeployError> {
        let endpoints = &settings.endpoints;
        let timeout = options.http_timeout;

        let cluster = EcsClient::new(HttpClient::new(endpoints.ecs.clone(), ECS_TARGET_PREFIX, timeout)?);
        let pipeline = PipelineClient::new(HttpClient::new(
            endpoints.codepipeline.clone(),
            PIPELINE_TARGET_PREFIX,
            timeout,
        )?);
        let parameters = SsmClient::new(HttpClient::new(endpoints.ssm.clone(), SSM_TARGET_PREFIX, timeout)?);

        let materializer: Arc<dyn ArtifactMaterializer> = match artifacts_dir {
            Some(root) => {
                info!("Reading artifacts from {}", root.display());
                Arc::new(LocalMaterializer::new(root))
            }
            None => Arc::new(HttpMaterializer::new(endpoints.s3.clone(), timeout)?),
        };

        Ok(Self {
            cluster: Arc::new(cluster),
            pipeline: Arc::new(pipeline),
            parameters: Arc::new(parameters),
            materializer,
        })
    }
}
