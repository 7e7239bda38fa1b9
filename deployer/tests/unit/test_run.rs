//! End to end job handling with in-memory collaborators

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ecs_api::TaskDefinition;
use ecs_deployer::app::options::AppOptions;
use ecs_deployer::app::run::run;
use ecs_deployer::clients::memory::{ClusterCall, ClusterOperation, JobOutcome, MemoryMaterializer, MemoryCluster};
use ecs_deployer::clients::ArtifactMaterializer;
use ecs_deployer::errors::DeployError;
use ecs_deployer::filesys::dir::Dir;
use pipeline_api::{Artifact, ArtifactCredentials, FAILURE_TYPE_JOB_FAILED};
use serde_json::json;

use crate::fixtures::*;

fn web_manifest(images: serde_json::Value) -> serde_json::Value {
    json!([{"ServiceName": "web", "ImageDefinitions": images}])
}

fn failure_message(harness: &Harness) -> String {
    match &harness.pipeline.outcomes()[..] {
        [JobOutcome::Failure(request)] => {
            assert_eq!(request.job_id, JOB_ID);
            assert_eq!(request.failure_details.failure_type, FAILURE_TYPE_JOB_FAILED);
            request.failure_details.message.clone()
        }
        other => panic!("expected a single failure, got {:?}", other),
    }
}

fn registered(cluster: &MemoryCluster, family: &str, revision: i64) -> TaskDefinition {
    cluster
        .task_definition(&cluster.task_definition_arn(family, revision))
        .unwrap()
}

#[tokio::test]
async fn test_new_image_is_rolled_out() {
    let harness = Harness::new(
        web_cluster(),
        manifest_materializer(web_manifest(json!([{"name": "app", "imageUri": "repo/app:v2"}]))),
    );

    let report = run(job_event(), &harness.state, &project_settings(), &AppOptions::default())
        .await
        .unwrap();

    let new_arn = harness.cluster.task_definition_arn("web", 6);
    assert_eq!(report.updated.len(), 1);
    assert_eq!(report.updated[0].service_name, "web");
    assert_eq!(report.updated[0].task_definition_arn, new_arn);

    let previous = registered(&harness.cluster, "web", 5);
    let candidate = registered(&harness.cluster, "web", 6);
    assert_eq!(candidate.container_definitions[0].name, "app");
    assert_eq!(candidate.container_definitions[0].image, "repo/app:v2");
    assert_eq!(candidate.container_definitions[1], previous.container_definitions[1]);
    assert_eq!(
        candidate.container_definitions[0].settings,
        previous.container_definitions[0].settings
    );
    assert_eq!(previous.container_definitions[0].image, "repo/app:v1");

    let web = harness.cluster.service("web").unwrap();
    assert_eq!(web.task_definition, new_arn);

    match &harness.pipeline.outcomes()[..] {
        [JobOutcome::Success(request)] => {
            assert_eq!(request.job_id, JOB_ID);
            let details = request.execution_details.as_ref().unwrap();
            assert_eq!(
                details.summary.as_deref(),
                Some(format!("Updated 1 service(s): web -> {}", new_arn).as_str())
            );
            assert_eq!(details.percent_complete, Some(100));
        }
        other => panic!("expected a single success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_deployment_settings_are_forwarded() {
    let harness = Harness::new(
        web_cluster(),
        manifest_materializer(web_manifest(json!([{"name": "sidecar", "imageUri": "repo/sidecar:v9"}]))),
    );

    run(job_event(), &harness.state, &project_settings(), &AppOptions::default())
        .await
        .unwrap();

    let updates: Vec<_> = harness
        .cluster
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            ClusterCall::UpdateService(update) => Some(update),
            _ => None,
        })
        .collect();

    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].cluster, CLUSTER);
    assert_eq!(updates[0].service, "web");
    assert_eq!(updates[0].deployment, deployment_settings());

    let body = serde_json::to_value(&updates[0]).unwrap();
    assert_eq!(body["desiredCount"], 3);
    assert_eq!(body["healthCheckGracePeriodSeconds"], 45);
    assert_eq!(body["deploymentConfiguration"]["deploymentCircuitBreaker"]["rollback"], true);
    assert_eq!(
        body["networkConfiguration"]["awsvpcConfiguration"]["subnets"],
        json!(["subnet-a", "subnet-b"])
    );
}

#[tokio::test]
async fn test_service_not_running_is_skipped() {
    let harness = Harness::new(
        web_cluster(),
        manifest_materializer(json!([
            {"ServiceName": "worker", "ImageDefinitions": [{"name": "app", "imageUri": "repo/worker:v2"}]}
        ])),
    );

    let report = run(job_event(), &harness.state, &project_settings(), &AppOptions::default())
        .await
        .unwrap();

    assert!(report.updated.is_empty());
    assert_eq!(harness.cluster.mutation_count(), 0);
    assert!(matches!(&harness.pipeline.outcomes()[..], [JobOutcome::Success(_)]));
}

#[tokio::test]
async fn test_unknown_container_aborts_and_reports() {
    let harness = Harness::new(
        web_cluster(),
        manifest_materializer(web_manifest(json!([
            {"name": "app", "imageUri": "repo/app:v2"},
            {"name": "cache", "imageUri": "repo/cache:v2"}
        ]))),
    );

    let err = run(job_event(), &harness.state, &project_settings(), &AppOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::ContainerNotFound(ref name) if name == "cache"));
    assert_eq!(harness.cluster.mutation_count(), 0);
    assert_eq!(failure_message(&harness), "could not find container cache");
}

#[tokio::test]
async fn test_unknown_container_in_later_service_touches_nothing() {
    let cluster = web_cluster().with_task_definition(task_definition(
        "api",
        2,
        vec![container("api", "repo/api:v1")],
    ));
    let api = service(&cluster, "api", "api", 2);
    let harness = Harness::new(
        cluster.with_service(api),
        manifest_materializer(json!([
            {"ServiceName": "web", "ImageDefinitions": [{"name": "app", "imageUri": "repo/app:v2"}]},
            {"ServiceName": "api", "ImageDefinitions": [{"name": "gateway", "imageUri": "repo/gw:v2"}]}
        ])),
    );

    let err = run(job_event(), &harness.state, &project_settings(), &AppOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "container_not_found");
    assert_eq!(harness.cluster.mutation_count(), 0);
    assert_eq!(
        harness.cluster.service("web").unwrap().task_definition,
        harness.cluster.task_definition_arn("web", 5)
    );
}

#[tokio::test]
async fn test_services_roll_out_in_cluster_order() {
    let cluster = web_cluster().with_task_definition(task_definition(
        "api",
        2,
        vec![container("api", "repo/api:v1")],
    ));
    let api = service(&cluster, "api", "api", 2);
    let harness = Harness::new(
        cluster.with_service(api),
        manifest_materializer(json!([
            {"ServiceName": "api", "ImageDefinitions": [{"name": "api", "imageUri": "repo/api:v2"}]},
            {"ServiceName": "web", "ImageDefinitions": [{"name": "app", "imageUri": "repo/app:v2"}]}
        ])),
    );

    let report = run(job_event(), &harness.state, &project_settings(), &AppOptions::default())
        .await
        .unwrap();

    let names: Vec<&str> = report.updated.iter().map(|r| r.service_name.as_str()).collect();
    assert_eq!(names, vec!["web", "api"]);

    let describe = harness.cluster.calls().into_iter().find_map(|call| match call {
        ClusterCall::DescribeServices(request) => Some(request),
        _ => None,
    });
    let describe = describe.unwrap();
    assert_eq!(describe.cluster, CLUSTER);
    assert_eq!(describe.services, vec!["api".to_string(), "web".to_string()]);
}

#[tokio::test]
async fn test_registration_failure_is_reported() {
    let cluster = web_cluster();
    cluster.fail_on(ClusterOperation::RegisterTaskDefinition);
    let harness = Harness::new(
        cluster,
        manifest_materializer(web_manifest(json!([{"name": "app", "imageUri": "repo/app:v2"}]))),
    );

    let err = run(job_event(), &harness.state, &project_settings(), &AppOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "registration_failed");
    assert!(!harness
        .cluster
        .calls()
        .iter()
        .any(|call| matches!(call, ClusterCall::UpdateService(_))));
    assert!(failure_message(&harness).starts_with("task definition registration failed"));
}

#[tokio::test]
async fn test_missing_manifest_is_reported() {
    let harness = Harness::new(
        web_cluster(),
        Arc::new(MemoryMaterializer::new(vec![("BuildOutput/taskdef.json", b"{}".as_slice())])),
    );

    let err = run(job_event(), &harness.state, &project_settings(), &AppOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "manifest_not_found");
    assert_eq!(failure_message(&harness), "could not find imagedefinitions.json");
    assert!(harness.cluster.calls().is_empty());
}

#[tokio::test]
async fn test_malformed_manifest_is_reported() {
    let harness = Harness::new(
        web_cluster(),
        Arc::new(MemoryMaterializer::new(vec![(
            "BuildOutput/imagedefinitions.json",
            b"{\"ServiceName\": \"web\"}".as_slice(),
        )])),
    );

    let err = run(job_event(), &harness.state, &project_settings(), &AppOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "manifest_malformed");
    assert!(failure_message(&harness).starts_with("malformed manifest"));
    assert!(harness.cluster.calls().is_empty());
}

#[tokio::test]
async fn test_artifact_failure_is_reported() {
    let harness = Harness::new(web_cluster(), Arc::new(MemoryMaterializer::failing("access denied")));

    let err = run(job_event(), &harness.state, &project_settings(), &AppOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "artifact");
    assert!(failure_message(&harness).contains("access denied"));
}

#[tokio::test]
async fn test_missing_project_is_reported_before_any_lookup() {
    let harness = Harness::new(
        web_cluster(),
        manifest_materializer(web_manifest(json!([{"name": "app", "imageUri": "repo/app:v2"}]))),
    );

    let err = run(job_event(), &harness.state, &settings(&[]), &AppOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "configuration");
    assert_eq!(failure_message(&harness), "Configuration error: no PROJECT_ID present");
    assert!(harness.parameters.requests().is_empty());
    assert!(harness.cluster.calls().is_empty());
}

#[tokio::test]
async fn test_cluster_is_read_from_project_parameters() {
    let harness = Harness::new(
        web_cluster(),
        manifest_materializer(web_manifest(json!([{"name": "app", "imageUri": "repo/app:v2"}]))),
    );

    run(job_event(), &harness.state, &project_settings(), &AppOptions::default())
        .await
        .unwrap();

    assert_eq!(harness.parameters.requests(), vec![("/shop".to_string(), None)]);
}

#[tokio::test]
async fn test_report_failure_surfaces_signal_error() {
    let harness = Harness::new(
        web_cluster(),
        manifest_materializer(web_manifest(json!([{"name": "cache", "imageUri": "repo/cache:v2"}]))),
    );
    harness.pipeline.fail_reports();

    let err = run(job_event(), &harness.state, &project_settings(), &AppOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "outcome_signal_failed");
    // the original cause was still sent
    assert_eq!(failure_message(&harness), "could not find container cache");
}

#[tokio::test]
async fn test_success_report_failure_is_an_error() {
    let harness = Harness::new(
        web_cluster(),
        manifest_materializer(web_manifest(json!([{"name": "app", "imageUri": "repo/app:v2"}]))),
    );
    harness.pipeline.fail_reports();

    let err = run(job_event(), &harness.state, &project_settings(), &AppOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "outcome_signal_failed");
    assert_eq!(harness.cluster.mutation_count(), 2);
}

/// Records where it was asked to write, then never finishes
#[derive(Default)]
struct StalledMaterializer {
    dest: Mutex<Option<PathBuf>>,
}

#[async_trait]
impl ArtifactMaterializer for StalledMaterializer {
    async fn materialize(
        &self,
        _artifacts: &[Artifact],
        _credentials: &ArtifactCredentials,
        dest: &Dir,
    ) -> Result<Vec<PathBuf>, DeployError> {
        dest.file("BuildOutput/partial.bin").write_bytes(b"partial").await?;
        *self.dest.lock().unwrap() = Some(dest.path().to_path_buf());
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_deadline_aborts_and_reports() {
    let materializer = Arc::new(StalledMaterializer::default());
    let harness = Harness::new(web_cluster(), materializer.clone());

    let err = run(job_event(), &harness.state, &short_timeout(), &AppOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::Timeout(deadline) if deadline == Duration::from_millis(100)));
    assert_eq!(failure_message(&harness), "deployment timed out after 100ms");
    assert_eq!(harness.cluster.mutation_count(), 0);
}

#[tokio::test]
async fn test_deadline_removes_scratch_space() {
    let materializer = Arc::new(StalledMaterializer::default());
    let harness = Harness::new(web_cluster(), materializer.clone());

    let err = run(job_event(), &harness.state, &short_timeout(), &AppOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "timeout");

    let scratch = materializer.dest.lock().unwrap().clone().unwrap();
    assert!(!Dir::new(&scratch).exists().await, "{} was left behind", scratch.display());
}
