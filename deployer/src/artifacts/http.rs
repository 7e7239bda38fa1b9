//! Object store materializer
//!
//! Fetches each artifact object with a plain `GET {endpoint}/{bucket}/{key}`
//! (path-style addressing) and unpacks it. The job's temporary session token
//! is forwarded in the `x-amz-security-token` header; signing is left to the
//! endpoint.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use pipeline_api::{Artifact, ArtifactCredentials};
use reqwest::Client;
use secrecy::ExposeSecret;
use tracing::{debug, error, info};
use url::Url;

use crate::artifacts::{archive, artifact_dir_name, object_file_name};
use crate::clients::ArtifactMaterializer;
use crate::errors::DeployError;
use crate::filesys::dir::Dir;

const SECURITY_TOKEN_HEADER: &str = "x-amz-security-token";

#[derive(Debug, Clone)]
pub struct HttpMaterializer {
    client: Client,
    endpoint: Url,
}

impl HttpMaterializer {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, DeployError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    /// Path-style URL of an artifact object
    pub fn object_url(&self, artifact: &Artifact) -> Result<Url, DeployError> {
        let location = &artifact.location.s3_location;
        let mut url = self.endpoint.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                DeployError::ConfigError(format!("{} cannot be used as an object store endpoint", self.endpoint))
            })?;
            segments.pop_if_empty().push(&location.bucket_name);
            segments.extend(location.object_key.split('/').filter(|s| !s.is_empty()));
        }
        Ok(url)
    }

    async fn download(&self, url: Url, credentials: &ArtifactCredentials) -> Result<Vec<u8>, DeployError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .header(SECURITY_TOKEN_HEADER, credentials.session_token.expose_secret())
            .send()
            .await
            .map_err(|e| DeployError::ArtifactError(format!("could not fetch {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("GET {} failed: {} - {}", url, status, body);
            return Err(DeployError::ArtifactError(format!("could not fetch {}: {}", url, status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DeployError::ArtifactError(format!("could not read {}: {}", url, e)))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ArtifactMaterializer for HttpMaterializer {
    async fn materialize(
        &self,
        artifacts: &[Artifact],
        credentials: &ArtifactCredentials,
        dest: &Dir,
    ) -> Result<Vec<PathBuf>, DeployError> {
        for (index, artifact) in artifacts.iter().enumerate() {
            let url = self.object_url(artifact)?;
            let data = self.download(url, credentials).await?;
            info!("Fetched artifact {} ({} bytes)", artifact.name, data.len());

            let target = dest.subdir(artifact_dir_name(artifact, index));
            let file_name = object_file_name(&artifact.location.s3_location.object_key);
            archive::unpack(data, file_name, &target).await?;
        }

        dest.walk_files().await
    }
}
