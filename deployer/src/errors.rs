//! Error types for the deployer

use thiserror::Error;

/// Main error type for a deployment run
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Artifact error: {0}")]
    ArtifactError(String),

    #[error("could not find {0}")]
    ManifestNotFound(String),

    #[error("malformed manifest: {0}")]
    ManifestMalformed(#[source] serde_json::Error),

    #[error("cluster query failed: {0}")]
    ClusterQueryFailed(String),

    #[error("could not find container {0}")]
    ContainerNotFound(String),

    #[error("task definition registration failed: {0}")]
    RegistrationFailed(String),

    #[error("service update failed: {0}")]
    ServiceUpdateFailed(String),

    #[error("failed to signal job outcome: {0}")]
    OutcomeSignalFailed(String),

    #[error("deployment timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeployError {
    /// Stable tag for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            DeployError::IoError(_) => "io",
            DeployError::JsonError(_) => "json",
            DeployError::HttpError(_) => "http",
            DeployError::ApiError(_) => "api",
            DeployError::ConfigError(_) => "configuration",
            DeployError::ArtifactError(_) => "artifact",
            DeployError::ManifestNotFound(_) => "manifest_not_found",
            DeployError::ManifestMalformed(_) => "manifest_malformed",
            DeployError::ClusterQueryFailed(_) => "cluster_query_failed",
            DeployError::ContainerNotFound(_) => "container_not_found",
            DeployError::RegistrationFailed(_) => "registration_failed",
            DeployError::ServiceUpdateFailed(_) => "service_update_failed",
            DeployError::OutcomeSignalFailed(_) => "outcome_signal_failed",
            DeployError::Timeout(_) => "timeout",
            DeployError::Internal(_) => "internal",
        }
    }
}
