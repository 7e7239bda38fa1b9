//! Reconciliation of a service update request against a task definition
//!
//! Given the task definition a service currently runs and the images the
//! manifest declares for it, build the registration payload of the next
//! revision. The candidate is a clone of the current definition in which only
//! the `image` of matched containers differs; container order and every other
//! setting are kept as the orchestrator returned them.

use ecs_api::{ContainerDefinition, RegisterTaskDefinitionRequest, TaskDefinition};

use crate::errors::DeployError;
use crate::models::manifest::ServiceUpdateRequest;

/// Name-sorted view over a container list.
///
/// Orchestrator responses are not name-ordered, so lookups go through this
/// index rather than searching the list directly.
#[derive(Debug, Clone)]
pub struct ContainerIndex<'a> {
    entries: Vec<(&'a str, usize)>,
}

impl<'a> ContainerIndex<'a> {
    pub fn new(containers: &'a [ContainerDefinition]) -> Self {
        let mut entries: Vec<(&'a str, usize)> = containers
            .iter()
            .enumerate()
            .map(|(pos, container)| (container.name.as_str(), pos))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        Self { entries }
    }

    /// Position of the named container in the original list
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .binary_search_by(|(entry, _)| (*entry).cmp(name))
            .ok()
            .map(|found| self.entries[found].1)
    }
}

/// Build the candidate definition with the requested images substituted.
///
/// Fails with [`DeployError::ContainerNotFound`] on the first image update
/// naming a container the definition does not have.
pub fn reconcile(
    request: &ServiceUpdateRequest,
    current: &TaskDefinition,
) -> Result<RegisterTaskDefinitionRequest, DeployError> {
    let index = ContainerIndex::new(&current.container_definitions);

    let mut substitutions = Vec::with_capacity(request.image_updates.len());
    for update in &request.image_updates {
        let pos = index
            .position(&update.container_name)
            .ok_or_else(|| DeployError::ContainerNotFound(update.container_name.clone()))?;
        substitutions.push((pos, update.image_uri.as_str()));
    }

    let mut candidate = RegisterTaskDefinitionRequest::from(current.clone());
    for (pos, image) in substitutions {
        candidate.container_definitions[pos].image = image.to_string();
    }

    Ok(candidate)
}
