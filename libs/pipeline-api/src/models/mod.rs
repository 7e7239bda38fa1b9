//! Pipeline job models

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

/// Failure type reported for every failed job
pub const FAILURE_TYPE_JOB_FAILED: &str = "JobFailed";

/// Event delivered by the pipeline when it invokes the action
#[derive(Debug, Clone, Deserialize)]
pub struct JobEvent {
    #[serde(rename = "CodePipeline.job")]
    pub job: Job,
}

/// A pipeline job
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,

    #[serde(default)]
    pub account_id: Option<String>,

    pub data: JobData,
}

/// Job payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobData {
    #[serde(default)]
    pub input_artifacts: Vec<Artifact>,

    #[serde(default)]
    pub output_artifacts: Vec<Artifact>,

    pub artifact_credentials: ArtifactCredentials,

    #[serde(default)]
    pub action_configuration: Option<serde_json::Value>,
}

/// An artifact produced by an earlier pipeline stage
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub revision: Option<String>,

    pub location: ArtifactLocation,
}

/// Where an artifact is stored
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactLocation {
    #[serde(rename = "type", default)]
    pub location_type: Option<String>,

    pub s3_location: S3Location,
}

/// Bucket/object location of an artifact
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Location {
    pub bucket_name: String,
    pub object_key: String,
}

/// Scoped, time-limited credentials for reading the job's artifacts
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactCredentials {
    pub access_key_id: String,

    #[serde(deserialize_with = "deserialize_secret")]
    pub secret_access_key: SecretString,

    #[serde(deserialize_with = "deserialize_secret")]
    pub session_token: SecretString,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(SecretString::from(raw))
}

/// Details attached to a successful job result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_execution_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_complete: Option<u8>,
}

/// Structured failure reason
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureDetails {
    #[serde(rename = "type")]
    pub failure_type: String,

    pub message: String,
}

impl FailureDetails {
    /// A `JobFailed` failure with the given message
    pub fn job_failed(message: impl Into<String>) -> Self {
        Self {
            failure_type: FAILURE_TYPE_JOB_FAILED.to_string(),
            message: message.into(),
        }
    }
}

/// `PutJobSuccessResult` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutJobSuccessResultRequest {
    pub job_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_details: Option<ExecutionDetails>,
}

/// `PutJobFailureResult` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutJobFailureResultRequest {
    pub job_id: String,
    pub failure_details: FailureDetails,
}
