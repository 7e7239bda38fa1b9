//! Artifact materialization
//!
//! Turns the job's input artifacts into files on local disk. Objects are
//! either unpacked (zip, tar or tar.gz) or stored as-is.

pub mod archive;
pub mod http;
pub mod local;

pub use self::http::HttpMaterializer;
pub use self::local::LocalMaterializer;

use pipeline_api::Artifact;

/// Directory name an artifact is materialized under
pub(crate) fn artifact_dir_name(artifact: &Artifact, index: usize) -> String {
    let name: String = artifact
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    if name.is_empty() {
        format!("artifact-{}", index)
    } else {
        name
    }
}

/// Last path segment of an object key
pub(crate) fn object_file_name(object_key: &str) -> &str {
    object_key
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("artifact")
}
