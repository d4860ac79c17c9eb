//! Artifact storage seam.
//!
//! Rendered notices are handed to an [`ArtifactStore`] as bytes plus the
//! conventional filename; delivery (email/WhatsApp attachment dispatch) is
//! an external collaborator.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

/// Destination for durable notice documents.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist `bytes` under `filename`, returning a locator for the
    /// stored artifact.
    async fn put(&self, filename: &str, bytes: &[u8]) -> io::Result<String>;
}

/// Filesystem-backed artifact store.
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// Store artifacts under `root`, creating it on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The configured root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn put(&self, filename: &str, bytes: &[u8]) -> io::Result<String> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(filename);
        tokio::fs::write(&path, bytes).await?;
        info!(path = %path.display(), size = bytes.len(), "notice artifact written");
        Ok(path.display().to_string())
    }
}
