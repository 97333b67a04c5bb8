//! # Core Configuration Module
//!
//! Provides configuration management for the device core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the storage bridge and the on-device layout. It
//! enforces fail-fast validation so a missing storage provider is reported
//! before any database is opened.
//!
//! ## Required Dependencies
//!
//! - `DeviceStorage` - Whole-file access to the mounted player
//!
//! When the `desktop-shims` feature is enabled,
//! [`device_root`](CoreConfigBuilder::device_root) injects the tokio-backed
//! storage from `bridge-desktop`.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .storage(Arc::new(MyStorage))
//!     .embed_tags_on_read(false)
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // This will panic with an actionable error message
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - missing storage bridge");
//! ```

use crate::error::{Error, Result};
use bridge_traits::DeviceStorage;
use std::path::PathBuf;
use std::sync::Arc;

/// Names of the directories and files that make up a player's catalog.
///
/// Defaults match the players that carry an `ESYS` root directory. Every
/// entry can be overridden, which is mostly useful for tests and for players
/// with non-standard firmware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceLayout {
    /// Root marker directory of the playlist database variant
    pub root_dir: String,
    /// Root marker directory of the newer, unsupported database variant
    pub alternate_root_dir: String,
    /// Subdirectory of `root_dir` holding the track containers
    pub data_dir: String,
    /// Primary database file inside `root_dir`
    pub database_file: String,
    /// Backup written before every database rewrite
    pub backup_file: String,
    /// Extension of the track container files
    pub container_extension: String,
    /// Extension used when composing display file names for imported tracks
    pub display_extension: String,
}

impl Default for DeviceLayout {
    fn default() -> Self {
        Self {
            root_dir: "ESYS".to_string(),
            alternate_root_dir: "OMGAUDIO".to_string(),
            data_dir: "NW-MP3".to_string(),
            database_file: "PBLIST1.DAT".to_string(),
            backup_file: "PBLIST0.DAT".to_string(),
            container_extension: "DAT".to_string(),
            display_extension: "mp3".to_string(),
        }
    }
}

impl DeviceLayout {
    /// Path of the root marker directory
    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(&self.root_dir)
    }

    /// Path of the alternate variant's root marker directory
    pub fn alternate_root_path(&self) -> PathBuf {
        PathBuf::from(&self.alternate_root_dir)
    }

    /// Path of the primary database file
    pub fn database_path(&self) -> PathBuf {
        self.root_path().join(&self.database_file)
    }

    /// Path of the database backup file
    pub fn backup_path(&self) -> PathBuf {
        self.root_path().join(&self.backup_file)
    }

    /// Path of the track container directory
    pub fn data_path(&self) -> PathBuf {
        self.root_path().join(&self.data_dir)
    }

    /// File name of the container holding track `id`: `MP` followed by the
    /// id as four uppercase hex digits
    pub fn container_file_name(&self, id: u16) -> String {
        format!("MP{:04X}.{}", id, self.container_extension)
    }

    /// Path of the container holding track `id`
    pub fn container_path(&self, id: u16) -> PathBuf {
        self.data_path().join(self.container_file_name(id))
    }

    /// Validates that no entry is empty or tries to leave its parent
    pub fn validate(&self) -> Result<()> {
        let entries = [
            ("root_dir", &self.root_dir),
            ("alternate_root_dir", &self.alternate_root_dir),
            ("data_dir", &self.data_dir),
            ("database_file", &self.database_file),
            ("backup_file", &self.backup_file),
            ("container_extension", &self.container_extension),
        ];

        for (field, value) in entries {
            if value.is_empty() {
                return Err(Error::Config(format!("{} cannot be empty", field)));
            }
            if value.contains('/') || value.contains('\\') || value == ".." {
                return Err(Error::Config(format!(
                    "{} must be a single path component, got '{}'",
                    field, value
                )));
            }
        }

        if self.database_file == self.backup_file {
            return Err(Error::Config(
                "backup_file must differ from database_file".to_string(),
            ));
        }

        Ok(())
    }
}

/// Core configuration for the device core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Storage bridge for the mounted device (required)
    pub storage: Arc<dyn DeviceStorage>,

    /// Directory and file names on the device
    pub layout: DeviceLayout,

    /// Re-embed the known title/artist as a tag block when reading a track
    pub embed_tags_on_read: bool,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("storage", &"DeviceStorage { ... }")
            .field("layout", &self.layout)
            .field("embed_tags_on_read", &self.embed_tags_on_read)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()
    }
}

fn storage_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "DeviceStorage".to_string(),
        message: "DeviceStorage implementation is required to reach the player. \
                 Desktop: enable the 'desktop-shims' feature and call device_root(). \
                 Web: inject a directory-handle backed storage."
            .to_string(),
    }
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    storage: Option<Arc<dyn DeviceStorage>>,
    layout: Option<DeviceLayout>,
    embed_tags_on_read: Option<bool>,
}

impl CoreConfigBuilder {
    /// Sets the storage bridge.
    pub fn storage(mut self, storage: Arc<dyn DeviceStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Uses the tokio-backed storage for a device mounted at `root`.
    #[cfg(feature = "desktop-shims")]
    pub fn device_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        use bridge_desktop::TokioDeviceStorage;

        self.storage = Some(Arc::new(TokioDeviceStorage::new(root)));
        self
    }

    /// Overrides the device layout.
    pub fn layout(mut self, layout: DeviceLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Controls whether `read_track_file` re-embeds title/artist tags.
    ///
    /// Default: `true`
    pub fn embed_tags_on_read(mut self, enable: bool) -> Self {
        self.embed_tags_on_read = Some(enable);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] if no storage bridge was provided
    /// - [`Error::Config`] if the layout is invalid
    pub fn build(self) -> Result<CoreConfig> {
        let storage = self.storage.ok_or_else(storage_missing_error)?;

        let config = CoreConfig {
            storage,
            layout: self.layout.unwrap_or_default(),
            embed_tags_on_read: self.embed_tags_on_read.unwrap_or(true),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bytes::Bytes;
    use std::path::Path;

    struct NullStorage;

    #[async_trait]
    impl DeviceStorage for NullStorage {
        async fn directory_exists(&self, _path: &Path) -> BridgeResult<bool> {
            Ok(false)
        }
        async fn ensure_directory(&self, _path: &Path) -> BridgeResult<()> {
            Ok(())
        }
        async fn read_file(&self, _path: &Path) -> BridgeResult<Bytes> {
            Ok(Bytes::new())
        }
        async fn write_file(&self, _path: &Path, _data: Bytes) -> BridgeResult<()> {
            Ok(())
        }
        async fn delete_file(&self, _path: &Path) -> BridgeResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_default_layout_paths() {
        let layout = DeviceLayout::default();
        assert_eq!(layout.database_path(), Path::new("ESYS/PBLIST1.DAT"));
        assert_eq!(layout.backup_path(), Path::new("ESYS/PBLIST0.DAT"));
        assert_eq!(layout.data_path(), Path::new("ESYS/NW-MP3"));
    }

    #[test]
    fn test_container_file_name_is_uppercase_hex() {
        let layout = DeviceLayout::default();
        assert_eq!(layout.container_file_name(1), "MP0001.DAT");
        assert_eq!(layout.container_file_name(0x2af), "MP02AF.DAT");
        assert_eq!(layout.container_file_name(u16::MAX), "MPFFFF.DAT");
        assert_eq!(
            layout.container_path(10),
            Path::new("ESYS/NW-MP3/MP000A.DAT")
        );
    }

    #[test]
    fn test_layout_validation() {
        assert!(DeviceLayout::default().validate().is_ok());

        let layout = DeviceLayout {
            data_dir: String::new(),
            ..DeviceLayout::default()
        };
        assert!(layout.validate().is_err());

        let layout = DeviceLayout {
            database_file: "../PBLIST1.DAT".to_string(),
            ..DeviceLayout::default()
        };
        assert!(layout.validate().is_err());

        let layout = DeviceLayout {
            backup_file: "PBLIST1.DAT".to_string(),
            ..DeviceLayout::default()
        };
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_builder_requires_storage() {
        let result = CoreConfig::builder().build();
        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "DeviceStorage");
            }
            other => panic!("expected CapabilityMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_defaults() {
        let config = CoreConfig::builder()
            .storage(Arc::new(NullStorage))
            .build()
            .unwrap();

        assert!(config.embed_tags_on_read);
        assert_eq!(config.layout, DeviceLayout::default());
    }

    #[test]
    fn test_builder_overrides() {
        let layout = DeviceLayout {
            root_dir: "TEST".to_string(),
            ..DeviceLayout::default()
        };
        let config = CoreConfig::builder()
            .storage(Arc::new(NullStorage))
            .layout(layout)
            .embed_tags_on_read(false)
            .build()
            .unwrap();

        assert!(!config.embed_tags_on_read);
        assert_eq!(config.layout.database_path(), Path::new("TEST/PBLIST1.DAT"));
    }
}
