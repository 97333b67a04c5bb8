//! Device Storage Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::DeviceStorage,
};
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Tokio-based device storage rooted at a mount point
///
/// Provides whole-file operations using:
/// - `tokio::fs` for async operations
/// - Write-to-temp, fsync, then rename for atomic, durable replacement
/// - Relative path resolution confined to the mount point
pub struct TokioDeviceStorage {
    root: PathBuf,
}

impl TokioDeviceStorage {
    /// Create a storage accessor for the device mounted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Mount point this storage resolves paths against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a device-relative path, refusing anything that would escape
    /// the mount point
    fn resolve(&self, path: &Path) -> Result<PathBuf> {
        let mut resolved = self.root.clone();
        for component in path.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(BridgeError::OperationFailed(format!(
                        "Path escapes device root: {}",
                        path.display()
                    )))
                }
            }
        }
        Ok(resolved)
    }

    /// Convert std::io::Error to BridgeError, keeping the requested path for
    /// missing entries
    fn map_io_error(path: &Path, e: std::io::Error) -> BridgeError {
        if e.kind() == ErrorKind::NotFound {
            BridgeError::NotFound(path.to_path_buf())
        } else {
            BridgeError::Io(e)
        }
    }

    /// Write `data` to a fresh file and flush it to the device
    async fn write_synced(staging: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut file = File::create(staging).await?;
        file.write_all(data).await?;
        file.sync_all().await
    }

    /// Flush a directory entry change such as a rename
    #[cfg(unix)]
    async fn sync_directory(dir: &Path) -> std::io::Result<()> {
        File::open(dir).await?.sync_all().await
    }

    #[cfg(not(unix))]
    async fn sync_directory(_dir: &Path) -> std::io::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl DeviceStorage for TokioDeviceStorage {
    async fn directory_exists(&self, path: &Path) -> Result<bool> {
        let full = self.resolve(path)?;
        match fs::metadata(&full).await {
            Ok(metadata) => Ok(metadata.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BridgeError::Io(e)),
        }
    }

    async fn ensure_directory(&self, path: &Path) -> Result<()> {
        let full = self.resolve(path)?;
        fs::create_dir_all(&full)
            .await
            .map_err(|e| Self::map_io_error(path, e))?;
        debug!(path = ?full, "Ensured directory");
        Ok(())
    }

    async fn read_file(&self, path: &Path) -> Result<Bytes> {
        let full = self.resolve(path)?;
        let data = fs::read(&full)
            .await
            .map_err(|e| Self::map_io_error(path, e))?;
        debug!(path = ?full, size = data.len(), "Read file");
        Ok(Bytes::from(data))
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()> {
        let full = self.resolve(path)?;
        let parent = full.parent().ok_or_else(|| {
            BridgeError::OperationFailed(format!("No parent directory for {}", path.display()))
        })?;
        fs::create_dir_all(parent)
            .await
            .map_err(|e| Self::map_io_error(path, e))?;

        // Rename within one directory is atomic on every desktop file system.
        let staging = parent.join(format!(".{}.tmp", Uuid::new_v4().simple()));
        if let Err(e) = Self::write_synced(&staging, data.as_ref()).await {
            let _ = fs::remove_file(&staging).await;
            return Err(Self::map_io_error(path, e));
        }
        if let Err(e) = fs::rename(&staging, &full).await {
            let _ = fs::remove_file(&staging).await;
            return Err(Self::map_io_error(path, e));
        }
        // The data is already on disk; a failed directory flush only loses
        // the ordering guarantee for the rename itself.
        if let Err(e) = Self::sync_directory(parent).await {
            warn!(path = ?parent, error = %e, "Failed to sync directory");
        }

        debug!(path = ?full, size = data.len(), "Wrote file");
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        let full = self.resolve(path)?;
        fs::remove_file(&full)
            .await
            .map_err(|e| Self::map_io_error(path, e))?;
        debug!(path = ?full, "Deleted file");
        Ok(())
    }
}
