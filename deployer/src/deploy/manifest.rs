//! Manifest retrieval and decoding

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pipeline_api::Job;
use tracing::{debug, info, warn};

use crate::clients::ArtifactMaterializer;
use crate::errors::DeployError;
use crate::filesys::dir::Dir;
use crate::filesys::file::File;
use crate::models::manifest::{ServiceManifest, ServiceUpdateRequest};
use crate::utils::sha256_hash;

/// Conventional name of the manifest inside the build artifact
pub const MANIFEST_FILE_NAME: &str = "imagedefinitions.json";

/// Find the manifest among materialized files.
///
/// Candidates are paths containing `file_name`; the lexically first one wins.
pub fn locate_manifest<'a>(paths: &'a [PathBuf], file_name: &str) -> Result<&'a Path, DeployError> {
    let mut candidates: Vec<&PathBuf> = paths
        .iter()
        .filter(|path| path.to_string_lossy().contains(file_name))
        .collect();
    candidates.sort();

    let first: &'a PathBuf = match candidates.first() {
        Some(&first) => first,
        None => return Err(DeployError::ManifestNotFound(file_name.to_string())),
    };

    if candidates.len() > 1 {
        warn!(
            "Found {} candidates for {}, using {}",
            candidates.len(),
            file_name,
            first.display()
        );
    }

    Ok(first.as_path())
}

/// Decode manifest contents into a sorted manifest
pub fn parse_manifest(data: &[u8]) -> Result<ServiceManifest, DeployError> {
    let requests: Vec<ServiceUpdateRequest> =
        serde_json::from_slice(data).map_err(DeployError::ManifestMalformed)?;
    Ok(ServiceManifest::new(requests))
}

/// Locate, read and decode the manifest from a set of materialized files
pub async fn load_manifest(paths: &[PathBuf], file_name: &str) -> Result<ServiceManifest, DeployError> {
    let path = locate_manifest(paths, file_name)?;
    let data = File::new(path)
        .read_bytes()
        .await
        .map_err(|e| DeployError::ArtifactError(format!("could not read definition: {}", e)))?;

    info!(
        manifest.path = %path.display(),
        manifest.sha256 = %sha256_hash(&data),
        manifest.payload = %String::from_utf8_lossy(&data),
        "Service definition read from artifact"
    );

    parse_manifest(&data)
}

/// Materialize the job's input artifacts into scratch space and load the
/// manifest from them. The scratch space is removed whatever the outcome.
pub async fn fetch_manifest(
    materializer: Arc<dyn ArtifactMaterializer>,
    job: &Job,
    file_name: &str,
) -> Result<ServiceManifest, DeployError> {
    // removed on drop, including when the run deadline cancels this future
    let scratch = tempfile::Builder::new().prefix("ecs-deploy-").tempdir()?;
    let dest = Dir::new(scratch.path());
    debug!("Materializing {} artifact(s) into {}", job.data.input_artifacts.len(), dest.path().display());

    let result: Result<ServiceManifest, DeployError> = async {
        let files = materializer
            .materialize(&job.data.input_artifacts, &job.data.artifact_credentials, &dest)
            .await
            .map_err(|e| match e {
                DeployError::ArtifactError(_) => e,
                other => DeployError::ArtifactError(other.to_string()),
            })?;
        load_manifest(&files, file_name).await
    }
    .await;

    if let Err(e) = scratch.close() {
        warn!("Failed to remove scratch dir {}: {}", dest.path().display(), e);
    }

    result
}
