//! Collaborator seams
//!
//! Everything the deployment core talks to across the network sits behind one
//! of these traits: the orchestrator, the pipeline, the parameter store and
//! the artifact store. Production implementations live in [`crate::http`] and
//! [`crate::artifacts`]. In-process implementations that record every call
//! live in `memory`, built for tests and the `test-util` feature.

#[cfg(any(test, feature = "test-util"))]
pub mod memory;

use std::path::PathBuf;

use async_trait::async_trait;
use ecs_api::{
    DescribeServicesRequest, DescribeServicesResponse, RegisterTaskDefinitionRequest, Service,
    TaskDefinition, UpdateServiceRequest,
};
use pipeline_api::{
    Artifact, ArtifactCredentials, PutJobFailureResultRequest, PutJobSuccessResultRequest,
};

use crate::errors::DeployError;
use crate::filesys::dir::Dir;

/// Container orchestrator operations used by a deployment
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Describe the named services of a cluster in one call
    async fn describe_services(
        &self,
        request: DescribeServicesRequest,
    ) -> Result<DescribeServicesResponse, DeployError>;

    /// Resolve a task definition by ARN or `family:revision`
    async fn describe_task_definition(
        &self,
        task_definition: &str,
    ) -> Result<TaskDefinition, DeployError>;

    /// Register a new task definition revision
    async fn register_task_definition(
        &self,
        request: RegisterTaskDefinitionRequest,
    ) -> Result<TaskDefinition, DeployError>;

    /// Point a service at a task definition
    async fn update_service(&self, request: UpdateServiceRequest) -> Result<Service, DeployError>;
}

/// Job result reporting back to the pipeline
#[async_trait]
pub trait PipelineApi: Send + Sync {
    async fn put_job_success(&self, request: PutJobSuccessResultRequest) -> Result<(), DeployError>;

    async fn put_job_failure(&self, request: PutJobFailureResultRequest) -> Result<(), DeployError>;
}

/// A stored configuration parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Full hierarchical name, e.g. `/my-project/ecs-cluster`
    pub name: String,
    pub value: String,
}

/// One page of a parameter listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterPage {
    pub parameters: Vec<Parameter>,
    pub next_token: Option<String>,
}

/// Hierarchical key-value parameter store
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Fetch one page of the parameters below `path`, recursively and decrypted
    async fn get_parameters_by_path(
        &self,
        path: &str,
        next_token: Option<&str>,
    ) -> Result<ParameterPage, DeployError>;
}

/// Turns artifact references into local files
#[async_trait]
pub trait ArtifactMaterializer: Send + Sync {
    /// Materialize every artifact below `dest` and return the paths of all
    /// files produced
    async fn materialize(
        &self,
        artifacts: &[Artifact],
        credentials: &ArtifactCredentials,
        dest: &Dir,
    ) -> Result<Vec<PathBuf>, DeployError>;
}
