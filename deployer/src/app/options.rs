//! Application configuration options

use std::time::Duration;

use crate::deploy::manifest::MANIFEST_FILE_NAME;

/// In-process defaults that are not read from the environment
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Name of the manifest inside the build artifact
    pub manifest_file_name: String,

    /// Environment variable naming the project
    pub project_env_var: String,

    /// Parameter holding the target cluster identifier
    pub cluster_parameter: String,

    /// Parameters that must be present below the project path
    pub required_parameters: Vec<String>,

    /// Region used when none is configured
    pub default_region: String,

    /// Deadline of a whole run
    pub deploy_timeout: Duration,

    /// Timeout of a single HTTP request
    pub http_timeout: Duration,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            manifest_file_name: MANIFEST_FILE_NAME.to_string(),
            project_env_var: "PROJECT_ID".to_string(),
            cluster_parameter: "ecs-cluster".to_string(),
            required_parameters: vec!["ecs-cluster".to_string()],
            default_region: "eu-west-1".to_string(),
            deploy_timeout: Duration::from_secs(60),
            http_timeout: Duration::from_secs(30),
        }
    }
}
