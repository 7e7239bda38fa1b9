//! Shared builders for the integration tests

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ecs_api::{ContainerDefinition, DeploymentSettings, Service, TaskDefinition};
use ecs_deployer::app::options::AppOptions;
use ecs_deployer::app::settings::Settings;
use ecs_deployer::app::state::AppState;
use ecs_deployer::clients::memory::{MemoryCluster, MemoryMaterializer, MemoryParameterStore, MemoryPipeline};
use ecs_deployer::clients::ArtifactMaterializer;
use pipeline_api::JobEvent;
use serde_json::json;

pub const CLUSTER: &str = "prod";
pub const JOB_ID: &str = "11111111-2222-3333-4444-555555555555";

pub fn container(name: &str, image: &str) -> ContainerDefinition {
    serde_json::from_value(json!({
        "name": name,
        "image": image,
        "essential": true,
        "memoryReservation": 128,
        "environment": [{"name": "CONTAINER", "value": name}]
    }))
    .unwrap()
}

pub fn task_definition(family: &str, revision: i64, containers: Vec<ContainerDefinition>) -> TaskDefinition {
    TaskDefinition {
        task_definition_arn: None,
        family: family.to_string(),
        revision: Some(revision),
        container_definitions: containers,
        cpu: Some("256".to_string()),
        memory: Some("512".to_string()),
        execution_role_arn: Some("arn:aws:iam::000000000000:role/ecsTaskExecution".to_string()),
        task_role_arn: None,
        network_mode: Some("awsvpc".to_string()),
        volumes: None,
        placement_constraints: None,
        requires_compatibilities: Some(vec!["FARGATE".to_string()]),
    }
}

pub fn deployment_settings() -> DeploymentSettings {
    DeploymentSettings {
        desired_count: Some(3),
        health_check_grace_period_seconds: Some(45),
        deployment_configuration: Some(json!({
            "maximumPercent": 200,
            "minimumHealthyPercent": 100,
            "deploymentCircuitBreaker": {"enable": true, "rollback": true}
        })),
        network_configuration: Some(json!({
            "awsvpcConfiguration": {
                "subnets": ["subnet-a", "subnet-b"],
                "securityGroups": ["sg-1"],
                "assignPublicIp": "DISABLED"
            }
        })),
    }
}

pub fn service(cluster: &MemoryCluster, name: &str, family: &str, revision: i64) -> Service {
    Service {
        service_name: name.to_string(),
        cluster_arn: CLUSTER.to_string(),
        task_definition: cluster.task_definition_arn(family, revision),
        deployment: deployment_settings(),
    }
}

/// Cluster running `web` (containers `app`, `sidecar`)
pub fn web_cluster() -> MemoryCluster {
    let cluster = MemoryCluster::new().with_task_definition(task_definition(
        "web",
        5,
        vec![container("app", "repo/app:v1"), container("sidecar", "repo/sidecar:v1")],
    ));
    let web = service(&cluster, "web", "web", 5);
    cluster.with_service(web)
}

pub fn job_event() -> JobEvent {
    serde_json::from_value(json!({
        "CodePipeline.job": {
            "id": JOB_ID,
            "accountId": "000000000000",
            "data": {
                "actionConfiguration": {"configuration": {"FunctionName": "ecs-deployer"}},
                "inputArtifacts": [{
                    "name": "BuildOutput",
                    "revision": null,
                    "location": {
                        "type": "S3",
                        "s3Location": {"bucketName": "artifacts", "objectKey": "pipeline/BuildOutp/abc123"}
                    }
                }],
                "outputArtifacts": [],
                "artifactCredentials": {
                    "accessKeyId": "AKIDEXAMPLE",
                    "secretAccessKey": "secret",
                    "sessionToken": "token"
                }
            }
        }
    }))
    .unwrap()
}

pub fn settings(vars: &[(&str, &str)]) -> Settings {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Settings::from_lookup(&AppOptions::default(), move |key| vars.get(key).cloned()).unwrap()
}

pub fn project_settings() -> Settings {
    settings(&[("PROJECT_ID", "shop")])
}

pub fn parameters() -> Arc<MemoryParameterStore> {
    Arc::new(MemoryParameterStore::new(vec![
        ("/shop/ecs-cluster", CLUSTER),
        ("/shop/region", "local"),
    ]))
}

pub fn manifest_materializer(manifest: serde_json::Value) -> Arc<MemoryMaterializer> {
    let payload = serde_json::to_vec(&manifest).unwrap();
    Arc::new(MemoryMaterializer::new(vec![
        ("BuildOutput/imagedefinitions.json", payload.as_slice()),
        ("BuildOutput/README.md", b"build output".as_slice()),
    ]))
}

pub struct Harness {
    pub cluster: Arc<MemoryCluster>,
    pub pipeline: Arc<MemoryPipeline>,
    pub parameters: Arc<MemoryParameterStore>,
    pub state: AppState,
}

impl Harness {
    pub fn new(cluster: MemoryCluster, materializer: Arc<dyn ArtifactMaterializer>) -> Self {
        let cluster = Arc::new(cluster);
        let pipeline = Arc::new(MemoryPipeline::new());
        let parameters = parameters();
        let state = AppState {
            cluster: cluster.clone(),
            pipeline: pipeline.clone(),
            parameters: parameters.clone(),
            materializer,
        };
        Self {
            cluster,
            pipeline,
            parameters,
            state,
        }
    }
}

pub fn short_timeout() -> Settings {
    let mut settings = project_settings();
    settings.deploy_timeout = Duration::from_millis(100);
    settings
}
