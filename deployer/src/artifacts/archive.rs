//! Archive unpacking

use std::fs;
use std::io::{self, Cursor};
use std::path::Path;

use flate2::read::GzDecoder;
use tokio::task::spawn_blocking;
use tracing::debug;

use crate::errors::DeployError;
use crate::filesys::dir::Dir;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const TAR_MAGIC_OFFSET: usize = 257;
const TAR_MAGIC: &[u8] = b"ustar";

/// Kind of content an artifact object holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    Tar,
    Zip,
    Plain,
}

impl ArchiveKind {
    /// Sniff the kind from the leading bytes
    pub fn detect(data: &[u8]) -> Self {
        if data.starts_with(GZIP_MAGIC) {
            ArchiveKind::TarGz
        } else if data.starts_with(ZIP_MAGIC) {
            ArchiveKind::Zip
        } else if data
            .get(TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + TAR_MAGIC.len())
            .is_some_and(|magic| magic == TAR_MAGIC)
        {
            ArchiveKind::Tar
        } else {
            ArchiveKind::Plain
        }
    }
}

/// Unpack `data` into `dest`. Non-archives are stored as `dest/file_name`.
pub async fn unpack(data: Vec<u8>, file_name: &str, dest: &Dir) -> Result<(), DeployError> {
    dest.create().await?;

    let kind = ArchiveKind::detect(&data);
    debug!("Unpacking {} ({:?}, {} bytes) into {}", file_name, kind, data.len(), dest.path().display());

    match kind {
        ArchiveKind::Plain => dest.file(file_name).write_bytes(&data).await,
        ArchiveKind::Zip | ArchiveKind::Tar | ArchiveKind::TarGz => {
            let dest = dest.path().to_owned();
            spawn_blocking(move || match kind {
                ArchiveKind::Zip => unpack_zip_sync(&data, &dest),
                _ => unpack_tar_sync(&data, kind == ArchiveKind::TarGz, &dest),
            })
            .await
            .map_err(|e| DeployError::ArtifactError(e.to_string()))?
            .map_err(|e| DeployError::ArtifactError(format!("could not unpack {}: {}", file_name, e)))
        }
    }
}

/// Entries whose names leave `dest` are rejected
fn unpack_zip_sync(data: &[u8], dest: &Path) -> io::Result<()> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data)).map_err(io::Error::other)?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(io::Error::other)?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("entry {} points outside the archive", entry.name()),
            ));
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
    }

    Ok(())
}

fn unpack_tar_sync(data: &[u8], gzipped: bool, dest: &Path) -> io::Result<()> {
    if gzipped {
        tar::Archive::new(GzDecoder::new(Cursor::new(data))).unpack(dest)
    } else {
        tar::Archive::new(Cursor::new(data)).unpack(dest)
    }
}
