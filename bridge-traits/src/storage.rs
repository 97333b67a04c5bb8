//! Device Storage Abstraction
//!
//! Provides the platform-agnostic trait the core uses to reach files on a
//! mounted player. Paths are always relative to the device root.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

use crate::error::Result;

/// Whole-file access to a mounted device
///
/// Abstracts the byte-stream provider behind the core:
/// - Desktop: a mount point accessed through `tokio::fs`
/// - Web: a directory handle picked by the user
///
/// The core never performs partial or streamed I/O: every read returns the
/// complete entry and every write replaces it.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::DeviceStorage;
///
/// async fn backup(storage: &dyn DeviceStorage) -> Result<()> {
///     let data = storage.read_file(Path::new("ESYS/PBLIST1.DAT")).await?;
///     storage.write_file(Path::new("ESYS/PBLIST0.DAT"), data).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait DeviceStorage: Send + Sync {
    /// Check whether a directory exists, without creating it
    ///
    /// Used to probe for the root marker directories of each database variant.
    async fn directory_exists(&self, path: &Path) -> Result<bool>;

    /// Look up a directory, creating it (and its parents) if it is missing
    async fn ensure_directory(&self, path: &Path) -> Result<()>;

    /// Read an entire file into memory
    ///
    /// Missing files are reported as [`BridgeError::NotFound`](crate::BridgeError::NotFound).
    async fn read_file(&self, path: &Path) -> Result<Bytes>;

    /// Replace a file with `data`, creating it if it doesn't exist
    ///
    /// Implementations must make the replacement atomic: readers observe
    /// either the previous contents or the new contents, never a mix.
    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()>;

    /// Delete a file
    async fn delete_file(&self, path: &Path) -> Result<()>;
}
