//! API models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Deployment settings of a service that an update must carry over unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_count: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_check_grace_period_seconds: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_configuration: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_configuration: Option<Value>,
}

/// A service as reported by `DescribeServices`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub service_name: String,

    #[serde(default)]
    pub cluster_arn: String,

    /// Task definition ARN the service currently runs
    #[serde(default)]
    pub task_definition: String,

    #[serde(flatten)]
    pub deployment: DeploymentSettings,
}

/// Per-service failure entry returned alongside described services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    #[serde(default)]
    pub arn: Option<String>,

    #[serde(default)]
    pub reason: Option<String>,

    #[serde(default)]
    pub detail: Option<String>,
}

/// A container slot in a task definition.
///
/// Only `name` and `image` are interpreted; every other setting is kept
/// verbatim so a re-registered definition is identical apart from images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerDefinition {
    pub name: String,

    pub image: String,

    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

/// A registered task definition revision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_definition_arn: Option<String>,

    pub family: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<i64>,

    #[serde(default)]
    pub container_definitions: Vec<ContainerDefinition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_role_arn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_role_arn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement_constraints: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_compatibilities: Option<Vec<String>>,
}

/// `DescribeServices` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeServicesRequest {
    pub cluster: String,
    pub services: Vec<String>,
}

/// `DescribeServices` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeServicesResponse {
    #[serde(default)]
    pub services: Vec<Service>,

    #[serde(default)]
    pub failures: Vec<Failure>,
}

/// `DescribeTaskDefinition` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeTaskDefinitionRequest {
    pub task_definition: String,
}

/// `DescribeTaskDefinition` and `RegisterTaskDefinition` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinitionResponse {
    pub task_definition: TaskDefinition,
}

/// `RegisterTaskDefinition` request: a task definition without identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTaskDefinitionRequest {
    pub family: String,

    pub container_definitions: Vec<ContainerDefinition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_role_arn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_role_arn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement_constraints: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_compatibilities: Option<Vec<String>>,
}

impl From<TaskDefinition> for RegisterTaskDefinitionRequest {
    fn from(task: TaskDefinition) -> Self {
        Self {
            family: task.family,
            container_definitions: task.container_definitions,
            cpu: task.cpu,
            memory: task.memory,
            execution_role_arn: task.execution_role_arn,
            task_role_arn: task.task_role_arn,
            network_mode: task.network_mode,
            volumes: task.volumes,
            placement_constraints: task.placement_constraints,
            requires_compatibilities: task.requires_compatibilities,
        }
    }
}

/// `UpdateService` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequest {
    pub cluster: String,

    pub service: String,

    pub task_definition: String,

    #[serde(flatten)]
    pub deployment: DeploymentSettings,
}

/// `UpdateService` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceResponse {
    pub service: Service,
}

/// Error body returned by the JSON protocol on non-2xx responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "__type", default)]
    pub error_type: Option<String>,

    #[serde(alias = "Message", default)]
    pub message: Option<String>,
}
