//! Deployment manifest models

use serde::{Deserialize, Serialize};

/// An image to run in one named container of a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUpdate {
    /// Container name within the service's task definition
    #[serde(rename = "name")]
    pub container_name: String,

    /// Image reference to substitute
    #[serde(rename = "imageUri")]
    pub image_uri: String,
}

/// Image updates requested for one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceUpdateRequest {
    #[serde(rename = "ServiceName", alias = "serviceName")]
    pub service_name: String,

    #[serde(rename = "ImageDefinitions", alias = "imageDefinitions", default)]
    pub image_updates: Vec<ImageUpdate>,
}

/// The decoded manifest, ordered by service name.
///
/// The order is established once on construction and the collection is
/// immutable afterwards, so lookups can binary search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceManifest {
    requests: Vec<ServiceUpdateRequest>,
}

impl ServiceManifest {
    /// Build a manifest, sorting requests by service name
    pub fn new(mut requests: Vec<ServiceUpdateRequest>) -> Self {
        requests.sort_by(|a, b| a.service_name.cmp(&b.service_name));
        Self { requests }
    }

    /// Find the request for a service, if the manifest names it
    pub fn find(&self, service_name: &str) -> Option<&ServiceUpdateRequest> {
        self.requests
            .binary_search_by(|request| request.service_name.as_str().cmp(service_name))
            .ok()
            .map(|pos| &self.requests[pos])
    }

    /// Service names in manifest order
    pub fn service_names(&self) -> Vec<String> {
        self.requests
            .iter()
            .map(|request| request.service_name.clone())
            .collect()
    }

    pub fn requests(&self) -> &[ServiceUpdateRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
