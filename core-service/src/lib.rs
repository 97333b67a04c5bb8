//! Core service façade and bootstrap helpers.
//!
//! This crate wires the host-provided storage bridge into the codec crates and
//! exposes the device catalog as a [`DeviceDatabase`]. Desktop apps typically
//! enable the `desktop-shims` feature and call [`bootstrap_desktop`] with the
//! mount point of the player; other hosts build a [`CoreConfig`] around their
//! own [`DeviceStorage`](bridge_traits::DeviceStorage).

pub mod database;
pub mod detector;
pub mod error;

pub use database::EsysDatabase;
pub use detector::{detect, open_device, DatabaseKind, DeviceDatabase, TrackImport};
pub use error::{CoreError, Result};

pub use core_library::{Folder, FolderId, Track, TrackId};
pub use core_runtime::config::{CoreConfig, DeviceLayout};

use tracing::info;

/// Primary façade exposed to host applications.
#[derive(Clone, Debug)]
pub struct CoreService {
    config: CoreConfig,
}

impl CoreService {
    /// Create a new service from a validated configuration.
    pub fn new(config: CoreConfig) -> Self {
        Self { config }
    }

    /// Access the configuration being used by the service.
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Probe the device for a catalog format.
    pub async fn detect(&self) -> Result<DatabaseKind> {
        detect(self.config.storage.as_ref(), &self.config.layout).await
    }

    /// Open the catalog found on the device.
    pub async fn open_database(&self) -> Result<Box<dyn DeviceDatabase>> {
        let database = open_device(&self.config).await?;
        info!(kind = %database.kind(), "Device database ready");
        Ok(database)
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// ```no_run
/// # #[cfg(feature = "desktop-shims")]
/// # async fn example() -> core_service::Result<()> {
/// use core_service::{bootstrap_desktop, DeviceDatabase};
///
/// let core = bootstrap_desktop("/media/walkman")?;
/// let database = core.open_database().await?;
/// let folders = database.folders().await?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop(device_root: impl Into<std::path::PathBuf>) -> Result<CoreService> {
    let config = CoreConfig::builder().device_root(device_root).build()?;
    Ok(CoreService::new(config))
}
