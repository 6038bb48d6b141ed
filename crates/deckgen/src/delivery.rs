//! Handing finished artifacts to the user.

use deckgen_core::{Artifact, DeliveryFailure};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

/// Saves an artifact somewhere the user can reach it.
///
/// Delivery never consumes the artifact, so a failed save can be retried
/// with the same bytes.
pub trait Delivery {
    /// Save `artifact` under (a sanitized form of) `suggested_file_name`,
    /// returning where it went.
    fn deliver(
        &self,
        artifact: &Artifact,
        suggested_file_name: &str,
    ) -> Result<PathBuf, DeliveryFailure>;
}

/// Writes artifacts into a directory.
#[derive(Debug, Clone)]
pub struct FileDelivery {
    dir: PathBuf,
}

impl FileDelivery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Delivery for FileDelivery {
    fn deliver(
        &self,
        artifact: &Artifact,
        suggested_file_name: &str,
    ) -> Result<PathBuf, DeliveryFailure> {
        if artifact.is_empty() {
            return Err(DeliveryFailure::EmptyArtifact);
        }
        let name = sanitize_file_name(suggested_file_name, artifact.format.extension());
        let path = self.dir.join(name);
        std::fs::create_dir_all(&self.dir).map_err(|e| denied(e, &self.dir))?;
        std::fs::write(&path, &artifact.data).map_err(|e| denied(e, &path))?;
        info!(path = %path.display(), bytes = artifact.len(), "artifact delivered");
        Ok(path)
    }
}

fn denied(error: std::io::Error, path: &Path) -> DeliveryFailure {
    if error.kind() == ErrorKind::PermissionDenied {
        DeliveryFailure::Denied(path.display().to_string())
    } else {
        DeliveryFailure::Io(error)
    }
}

/// Keep only the final path component and replace characters that are not
/// portable in file names.
pub fn sanitize_file_name(name: &str, extension: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if cleaned.is_empty() {
        format!("presentation.{extension}")
    } else {
        cleaned.to_string()
    }
}
