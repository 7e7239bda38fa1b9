//! ECS API client

use async_trait::async_trait;
use ecs_api::{
    DescribeServicesRequest, DescribeServicesResponse, DescribeTaskDefinitionRequest,
    RegisterTaskDefinitionRequest, Service, TaskDefinition, TaskDefinitionResponse,
    UpdateServiceRequest, UpdateServiceResponse,
};

use crate::clients::ClusterApi;
use crate::errors::DeployError;
use crate::http::client::HttpClient;

/// Target prefix of the ECS JSON protocol
pub const ECS_TARGET_PREFIX: &str = "AmazonEC2ContainerServiceV20141113";

/// Orchestrator client over HTTP
#[derive(Debug, Clone)]
pub struct EcsClient {
    http: HttpClient,
}

impl EcsClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ClusterApi for EcsClient {
    async fn describe_services(
        &self,
        request: DescribeServicesRequest,
    ) -> Result<DescribeServicesResponse, DeployError> {
        self.http.call("DescribeServices", &request).await
    }

    async fn describe_task_definition(
        &self,
        task_definition: &str,
    ) -> Result<TaskDefinition, DeployError> {
        let request = DescribeTaskDefinitionRequest {
            task_definition: task_definition.to_string(),
        };
        let response: TaskDefinitionResponse =
            self.http.call("DescribeTaskDefinition", &request).await?;
        Ok(response.task_definition)
    }

    async fn register_task_definition(
        &self,
        request: RegisterTaskDefinitionRequest,
    ) -> Result<TaskDefinition, DeployError> {
        let response: TaskDefinitionResponse =
            self.http.call("RegisterTaskDefinition", &request).await?;
        Ok(response.task_definition)
    }

    async fn update_service(&self, request: UpdateServiceRequest) -> Result<Service, DeployError> {
        let response: UpdateServiceResponse = self.http.call("UpdateService", &request).await?;
        Ok(response.service)
    }
}
