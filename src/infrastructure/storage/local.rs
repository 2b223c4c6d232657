use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
#[error("failed to write {}: {source}", .path.display())]
pub struct StorageError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Random token namespacing the files of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_simple())
    }
}

/// The two inputs and the output belonging to one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSet {
    pub image: PathBuf,
    pub audio: PathBuf,
    pub output: PathBuf,
}

impl ArtifactSet {
    pub fn inputs(&self) -> Vec<PathBuf> {
        vec![self.image.clone(), self.audio.clone()]
    }

    pub fn all(&self) -> Vec<PathBuf> {
        vec![self.image.clone(), self.audio.clone(), self.output.clone()]
    }
}

/// Flat directory of short-lived upload and output files.
#[derive(Clone, Debug)]
pub struct TempFileStore {
    root: PathBuf,
}

impl TempFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_root(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.root).await?;
        info!("✅ Upload directory ready at {}", self.root.display());
        Ok(())
    }

    /// `image_ext` and `audio_ext` must already be allow-listed; they are used verbatim.
    pub fn allocate_paths(&self, job_id: JobId, image_ext: &str, audio_ext: &str) -> ArtifactSet {
        ArtifactSet {
            image: self.root.join(format!("{job_id}_img.{image_ext}")),
            audio: self.root.join(format!("{job_id}_aud.{audio_ext}")),
            output: self.root.join(format!("{job_id}_out.mp4")),
        }
    }

    pub async fn save(&self, data: &[u8], path: &Path) -> Result<(), StorageError> {
        fs::write(path, data).await.map_err(|source| StorageError {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Saved {} bytes to {}", data.len(), path.display());
        Ok(())
    }

    /// Removes `path`. A file that is already gone counts as deleted.
    pub async fn delete(&self, path: &Path) -> std::io::Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => {
                debug!("Deleted {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
