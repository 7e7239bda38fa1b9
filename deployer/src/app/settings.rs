//! Process settings
//!
//! Read once from the environment at startup. Tests inject a lookup closure
//! instead of touching the real environment.

use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::app::options::AppOptions;
use crate::errors::DeployError;
use crate::logs::{LogFormat, LogLevel, LogOptions};

/// Service endpoints the deployer talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub ecs: Url,
    pub codepipeline: Url,
    pub ssm: Url,
    pub s3: Url,
}

impl Endpoints {
    fn resolve(region: &str, lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, DeployError> {
        Ok(Self {
            ecs: endpoint("ECS_ENDPOINT", "ecs", region, lookup)?,
            codepipeline: endpoint("CODEPIPELINE_ENDPOINT", "codepipeline", region, lookup)?,
            ssm: endpoint("SSM_ENDPOINT", "ssm", region, lookup)?,
            s3: endpoint("S3_ENDPOINT", "s3", region, lookup)?,
        })
    }
}

fn endpoint(
    var: &str,
    service: &str,
    region: &str,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<Url, DeployError> {
    let raw = lookup(var).unwrap_or_else(|| format!("https://{}.{}.amazonaws.com", service, region));
    Url::parse(&raw).map_err(|e| DeployError::ConfigError(format!("invalid {} '{}': {}", var, raw, e)))
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Project namespace; its absence is reported to the pipeline, not here
    pub project_id: Option<String>,
    pub region: String,
    pub endpoints: Endpoints,
    pub deploy_timeout: Duration,
    pub log: LogOptions,
}

impl Settings {
    pub fn from_env(options: &AppOptions) -> Result<Self, DeployError> {
        Self::from_lookup(options, |key| std::env::var(key).ok())
    }

    pub fn from_lookup(
        options: &AppOptions,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, DeployError> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let region = lookup("AWS_REGION")
            .or_else(|| lookup("AWS_DEFAULT_REGION"))
            .unwrap_or_else(|| options.default_region.clone());

        let deploy_timeout = match lookup("DEPLOY_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(DeployError::ConfigError(format!(
                        "invalid DEPLOY_TIMEOUT_SECS '{}'",
                        raw
                    )))
                }
            },
            None => options.deploy_timeout,
        };

        let log_level = match lookup("LOG_LEVEL") {
            Some(raw) => LogLevel::from_str(&raw).map_err(DeployError::ConfigError)?,
            None => LogLevel::default(),
        };
        let format = match lookup("LOG_FORMAT") {
            Some(raw) => LogFormat::from_str(&raw).map_err(DeployError::ConfigError)?,
            None => LogFormat::default(),
        };

        Ok(Self {
            project_id: lookup(&options.project_env_var),
            endpoints: Endpoints::resolve(&region, &lookup)?,
            region,
            deploy_timeout,
            log: LogOptions { log_level, format },
        })
    }
}
