//! Local directory materializer
//!
//! Serves artifacts from `{root}/{bucket}/{key}`. A key naming a directory is
//! copied as-is; a key naming a file is unpacked like a downloaded object.

use std::path::PathBuf;

use async_trait::async_trait;
use pipeline_api::{Artifact, ArtifactCredentials};
use tracing::debug;

use crate::artifacts::{archive, artifact_dir_name, object_file_name};
use crate::clients::ArtifactMaterializer;
use crate::errors::DeployError;
use crate::filesys::dir::Dir;
use crate::filesys::file::File;

#[derive(Debug, Clone)]
pub struct LocalMaterializer {
    root: Dir,
}

impl LocalMaterializer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: Dir::new(root) }
    }

    pub fn root(&self) -> &Dir {
        &self.root
    }

    async fn copy_dir(&self, source: &Dir, target: &Dir) -> Result<(), DeployError> {
        for path in source.walk_files().await? {
            let relative = path
                .strip_prefix(source.path())
                .map_err(|e| DeployError::Internal(e.to_string()))?;
            let data = File::new(&path).read_bytes().await?;
            target.file(relative).write_bytes(&data).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ArtifactMaterializer for LocalMaterializer {
    async fn materialize(
        &self,
        artifacts: &[Artifact],
        _credentials: &ArtifactCredentials,
        dest: &Dir,
    ) -> Result<Vec<PathBuf>, DeployError> {
        for (index, artifact) in artifacts.iter().enumerate() {
            let location = &artifact.location.s3_location;
            let source = self.root.subdir(&location.bucket_name).subdir(&location.object_key);
            let target = dest.subdir(artifact_dir_name(artifact, index));
            debug!("Materializing {} from {}", artifact.name, source.path().display());

            let metadata = tokio::fs::metadata(source.path()).await.map_err(|e| {
                DeployError::ArtifactError(format!("could not open {}: {}", source.path().display(), e))
            })?;

            if metadata.is_dir() {
                self.copy_dir(&source, &target).await?;
            } else {
                let data = File::new(source.path()).read_bytes().await?;
                archive::unpack(data, object_file_name(&location.object_key), &target).await?;
            }
        }

        dest.walk_files().await
    }
}
