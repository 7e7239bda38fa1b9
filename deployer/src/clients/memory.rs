//! In-memory collaborators
//!
//! Each implementation keeps its state behind a `std::sync::Mutex` and records
//! the calls it receives, so a whole run can be replayed without a network.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use ecs_api::{
    DescribeServicesRequest, DescribeServicesResponse, Failure, RegisterTaskDefinitionRequest,
    Service, TaskDefinition, UpdateServiceRequest,
};
use pipeline_api::{
    Artifact, ArtifactCredentials, PutJobFailureResultRequest, PutJobSuccessResultRequest,
};

use crate::clients::{
    ArtifactMaterializer, ClusterApi, Parameter, ParameterPage, ParameterStore, PipelineApi,
};
use crate::errors::DeployError;
use crate::filesys::dir::Dir;

/// Cluster operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterOperation {
    DescribeServices,
    DescribeTaskDefinition,
    RegisterTaskDefinition,
    UpdateService,
}

/// A call received by [`MemoryCluster`]
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterCall {
    DescribeServices(DescribeServicesRequest),
    DescribeTaskDefinition(String),
    RegisterTaskDefinition(RegisterTaskDefinitionRequest),
    UpdateService(UpdateServiceRequest),
}

#[derive(Debug, Default)]
struct ClusterState {
    services: Vec<Service>,
    task_definitions: HashMap<String, TaskDefinition>,
    calls: Vec<ClusterCall>,
}

/// In-memory cluster
#[derive(Debug, Default)]
pub struct MemoryCluster {
    region: String,
    state: Mutex<ClusterState>,
    failing: Mutex<Vec<ClusterOperation>>,
}

impl MemoryCluster {
    pub fn new() -> Self {
        Self {
            region: "local".to_string(),
            ..Default::default()
        }
    }

    /// Add a registered task definition; its ARN is derived from family and revision
    pub fn with_task_definition(self, mut task: TaskDefinition) -> Self {
        let revision = task.revision.unwrap_or(1);
        let arn = self.task_definition_arn(&task.family, revision);
        task.revision = Some(revision);
        task.task_definition_arn = Some(arn.clone());
        self.lock().task_definitions.insert(arn, task);
        self
    }

    /// Add a running service
    pub fn with_service(self, service: Service) -> Self {
        self.lock().services.push(service);
        self
    }

    /// Make an operation fail from now on
    pub fn fail_on(&self, operation: ClusterOperation) {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(operation);
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<ClusterCall> {
        self.lock().calls.clone()
    }

    /// Number of mutating calls (registrations and service updates)
    pub fn mutation_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    ClusterCall::RegisterTaskDefinition(_) | ClusterCall::UpdateService(_)
                )
            })
            .count()
    }

    /// Current state of a service
    pub fn service(&self, name: &str) -> Option<Service> {
        self.lock()
            .services
            .iter()
            .find(|service| service.service_name == name)
            .cloned()
    }

    /// A registered task definition by ARN
    pub fn task_definition(&self, arn: &str) -> Option<TaskDefinition> {
        self.lock().task_definitions.get(arn).cloned()
    }

    pub fn task_definition_arn(&self, family: &str, revision: i64) -> String {
        format!(
            "arn:aws:ecs:{}:000000000000:task-definition/{}:{}",
            self.region, family, revision
        )
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ClusterState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check(&self, operation: ClusterOperation) -> Result<(), DeployError> {
        let failing = self.failing.lock().unwrap_or_else(|e| e.into_inner());
        if failing.contains(&operation) {
            return Err(DeployError::Internal(format!("{:?} unavailable", operation)));
        }
        Ok(())
    }
}

#[async_trait]
impl ClusterApi for MemoryCluster {
    async fn describe_services(
        &self,
        request: DescribeServicesRequest,
    ) -> Result<DescribeServicesResponse, DeployError> {
        self.lock()
            .calls
            .push(ClusterCall::DescribeServices(request.clone()));
        self.check(ClusterOperation::DescribeServices)?;

        let state = self.lock();
        let mut response = DescribeServicesResponse::default();

        // cluster order, not request order
        for service in &state.services {
            if request.services.contains(&service.service_name) {
                response.services.push(service.clone());
            }
        }

        for name in &request.services {
            if !state.services.iter().any(|s| &s.service_name == name) {
                response.failures.push(Failure {
                    arn: Some(name.clone()),
                    reason: Some("MISSING".to_string()),
                    detail: None,
                });
            }
        }

        Ok(response)
    }

    async fn describe_task_definition(
        &self,
        task_definition: &str,
    ) -> Result<TaskDefinition, DeployError> {
        self.lock()
            .calls
            .push(ClusterCall::DescribeTaskDefinition(task_definition.to_string()));
        self.check(ClusterOperation::DescribeTaskDefinition)?;

        self.lock()
            .task_definitions
            .get(task_definition)
            .cloned()
            .ok_or_else(|| {
                DeployError::Internal(format!("Unable to describe task definition {}", task_definition))
            })
    }

    async fn register_task_definition(
        &self,
        request: RegisterTaskDefinitionRequest,
    ) -> Result<TaskDefinition, DeployError> {
        self.lock()
            .calls
            .push(ClusterCall::RegisterTaskDefinition(request.clone()));
        self.check(ClusterOperation::RegisterTaskDefinition)?;

        let mut state = self.lock();
        let revision = state
            .task_definitions
            .values()
            .filter(|task| task.family == request.family)
            .filter_map(|task| task.revision)
            .max()
            .unwrap_or(0)
            + 1;
        let arn = self.task_definition_arn(&request.family, revision);

        let task = TaskDefinition {
            task_definition_arn: Some(arn.clone()),
            family: request.family,
            revision: Some(revision),
            container_definitions: request.container_definitions,
            cpu: request.cpu,
            memory: request.memory,
            execution_role_arn: request.execution_role_arn,
            task_role_arn: request.task_role_arn,
            network_mode: request.network_mode,
            volumes: request.volumes,
            placement_constraints: request.placement_constraints,
            requires_compatibilities: request.requires_compatibilities,
        };
        state.task_definitions.insert(arn, task.clone());

        Ok(task)
    }

    async fn update_service(&self, request: UpdateServiceRequest) -> Result<Service, DeployError> {
        self.lock()
            .calls
            .push(ClusterCall::UpdateService(request.clone()));
        self.check(ClusterOperation::UpdateService)?;

        let mut state = self.lock();
        let service = state
            .services
            .iter_mut()
            .find(|s| s.service_name == request.service && s.cluster_arn == request.cluster)
            .ok_or_else(|| DeployError::Internal(format!("Service not found: {}", request.service)))?;

        service.task_definition = request.task_definition;
        service.deployment = request.deployment;

        Ok(service.clone())
    }
}

/// A job result received by [`MemoryPipeline`]
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Success(PutJobSuccessResultRequest),
    Failure(PutJobFailureResultRequest),
}

/// In-memory pipeline
#[derive(Debug, Default)]
pub struct MemoryPipeline {
    outcomes: Mutex<Vec<JobOutcome>>,
    failing: Mutex<bool>,
}

impl MemoryPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every result from now on
    pub fn fail_reports(&self) {
        *self.failing.lock().unwrap_or_else(|e| e.into_inner()) = true;
    }

    /// Results received so far, in order
    pub fn outcomes(&self) -> Vec<JobOutcome> {
        self.outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn record(&self, outcome: JobOutcome) -> Result<(), DeployError> {
        self.outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(outcome);

        if *self.failing.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(DeployError::Internal("pipeline unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PipelineApi for MemoryPipeline {
    async fn put_job_success(&self, request: PutJobSuccessResultRequest) -> Result<(), DeployError> {
        self.record(JobOutcome::Success(request))
    }

    async fn put_job_failure(&self, request: PutJobFailureResultRequest) -> Result<(), DeployError> {
        self.record(JobOutcome::Failure(request))
    }
}

/// In-memory parameter store serving fixed-size pages
#[derive(Debug)]
pub struct MemoryParameterStore {
    parameters: Vec<Parameter>,
    page_size: usize,
    requests: Mutex<Vec<(String, Option<String>)>>,
}

impl MemoryParameterStore {
    pub fn new(parameters: Vec<(&str, &str)>) -> Self {
        Self {
            parameters: parameters
                .into_iter()
                .map(|(name, value)| Parameter {
                    name: name.to_string(),
                    value: value.to_string(),
                })
                .collect(),
            page_size: 10,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// `(path, next_token)` of every page request received
    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl ParameterStore for MemoryParameterStore {
    async fn get_parameters_by_path(
        &self,
        path: &str,
        next_token: Option<&str>,
    ) -> Result<ParameterPage, DeployError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((path.to_string(), next_token.map(str::to_string)));

        let start = match next_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| DeployError::ConfigError(format!("Invalid next token: {}", token)))?,
            None => 0,
        };

        let prefix = format!("{}/", path.trim_end_matches('/'));
        let matching: Vec<&Parameter> = self
            .parameters
            .iter()
            .filter(|p| p.name.starts_with(&prefix))
            .collect();

        let end = (start + self.page_size).min(matching.len());
        let next_token = (end < matching.len()).then(|| end.to_string());

        Ok(ParameterPage {
            parameters: matching[start.min(end)..end].iter().map(|p| (*p).clone()).collect(),
            next_token,
        })
    }
}

/// In-memory artifact store writing fixed files into the destination
#[derive(Debug, Default)]
pub struct MemoryMaterializer {
    files: Vec<(String, Vec<u8>)>,
    failure: Option<String>,
}

impl MemoryMaterializer {
    /// Files given as `(relative path, contents)`
    pub fn new(files: Vec<(&str, &[u8])>) -> Self {
        Self {
            files: files
                .into_iter()
                .map(|(path, contents)| (path.to_string(), contents.to_vec()))
                .collect(),
            failure: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            files: Vec::new(),
            failure: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl ArtifactMaterializer for MemoryMaterializer {
    async fn materialize(
        &self,
        _artifacts: &[Artifact],
        _credentials: &ArtifactCredentials,
        dest: &Dir,
    ) -> Result<Vec<PathBuf>, DeployError> {
        if let Some(message) = &self.failure {
            return Err(DeployError::ArtifactError(message.clone()));
        }

        let mut paths = Vec::with_capacity(self.files.len());
        for (path, contents) in &self.files {
            let file = dest.file(path);
            file.write_bytes(contents).await?;
            paths.push(file.path().to_path_buf());
        }
        Ok(paths)
    }
}
