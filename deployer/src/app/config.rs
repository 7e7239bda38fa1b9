//! Per-invocation deployment configuration
//!
//! Resolved once from [`Settings`] and the parameter store, then passed by
//! reference to everything that needs it.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info};

use crate::app::options::AppOptions;
use crate::app::settings::Settings;
use crate::clients::ParameterStore;
use crate::errors::DeployError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    pub project_id: String,
    pub cluster: String,
    pub manifest_file_name: String,
}

impl DeployConfig {
    /// Resolve the configuration of one run
    pub async fn resolve(
        settings: &Settings,
        options: &AppOptions,
        store: Arc<dyn ParameterStore>,
    ) -> Result<Self, DeployError> {
        let project_id = settings.project_id.clone().ok_or_else(|| {
            DeployError::ConfigError(format!("no {} present", options.project_env_var))
        })?;

        let parameters = fetch_parameters(store.as_ref(), &project_id).await?;

        let missing: Vec<&str> = options
            .required_parameters
            .iter()
            .filter(|name| !parameters.contains_key(name.as_str()))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(DeployError::ConfigError(format!(
                "missing parameter(s) under /{}: {}",
                project_id,
                missing.join(", ")
            )));
        }

        let cluster = parameters
            .get(&options.cluster_parameter)
            .cloned()
            .ok_or_else(|| {
                DeployError::ConfigError(format!(
                    "missing parameter /{}/{}",
                    project_id, options.cluster_parameter
                ))
            })?;
        info!("Resolved configuration for project {}: cluster {}", project_id, cluster);

        Ok(Self {
            project_id,
            cluster,
            manifest_file_name: options.manifest_file_name.clone(),
        })
    }
}

/// Every parameter below `/{project_id}`, keyed by its path relative to it.
///
/// Pages are requested until the store stops returning a continuation token.
pub async fn fetch_parameters(
    store: &dyn ParameterStore,
    project_id: &str,
) -> Result<BTreeMap<String, String>, DeployError> {
    let path = format!("/{}", project_id.trim_matches('/'));
    let prefix = format!("{}/", path);

    let mut parameters = BTreeMap::new();
    let mut next_token: Option<String> = None;
    let mut seen_tokens = HashSet::new();
    let mut pages = 0;

    loop {
        let page = store
            .get_parameters_by_path(&path, next_token.as_deref())
            .await
            .map_err(|e| DeployError::ConfigError(format!("could not read parameters under {}: {}", path, e)))?;
        pages += 1;

        for parameter in page.parameters {
            let key = parameter
                .name
                .strip_prefix(&prefix)
                .unwrap_or(&parameter.name)
                .to_string();
            parameters.insert(key, parameter.value);
        }

        match page.next_token {
            Some(token) if seen_tokens.insert(token.clone()) => next_token = Some(token),
            Some(token) => {
                return Err(DeployError::ConfigError(format!(
                    "parameter store repeated continuation token {}",
                    token
                )))
            }
            None => break,
        }
    }

    debug!("Read {} parameter(s) under {} in {} page(s)", parameters.len(), path, pages);
    Ok(parameters)
}
