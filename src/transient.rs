//! Short-lived on-disk copy of an uploaded image.
//!
//! The normal path removes the file with [`TransientFile::remove`]. Dropping the
//! guard without calling it removes the file synchronously instead, which covers
//! early `?` returns, panics and cancelled request futures.

use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug)]
pub struct TransientFile {
    path: PathBuf,
    removed: bool,
}

impl TransientFile {
    /// Writes `bytes` to a uniquely named file under `dir`.
    pub async fn create(dir: &Path, bytes: &[u8]) -> std::io::Result<Self> {
        let path = dir.join(format!("photo-{}.jpeg", Uuid::new_v4()));
        if let Err(e) = tokio::fs::write(&path, bytes).await {
            // A partial write may have left something behind
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e);
        }
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote transient image");
        Ok(Self { path, removed: false })
    }

    /// Deletes the file without blocking the runtime. A failure leaves the
    /// blocking retry in `Drop` armed.
    pub async fn remove(mut self) {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "removed transient image");
                self.removed = true;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => self.removed = true,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to remove transient image"
                )
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TransientFile {
    // Blocking unlink; only reached when `remove` was skipped or failed.
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed transient image"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to remove transient image"
                )
            }
        }
    }
}
