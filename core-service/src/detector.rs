//! Database variant detection
//!
//! Players carry one of two catalog formats, told apart by the root marker
//! directory on the device. Variants are probed in a fixed priority order and
//! the first marker found wins.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use bridge_traits::DeviceStorage;
use core_library::{Folder, LibraryError, Track, TrackId};
use core_runtime::config::{CoreConfig, DeviceLayout};

use crate::database::EsysDatabase;
use crate::error::{CoreError, Result};

/// Catalog format found on a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseKind {
    /// `ESYS` playlist database
    Esys,
    /// `OMGAUDIO` database, not supported
    OmgAudio,
}

impl DatabaseKind {
    /// Probe order used by [`detect`]
    pub const PRIORITY: [DatabaseKind; 2] = [DatabaseKind::Esys, DatabaseKind::OmgAudio];

    /// Root marker directory of this variant
    pub fn marker(self, layout: &DeviceLayout) -> PathBuf {
        match self {
            DatabaseKind::Esys => layout.root_path(),
            DatabaseKind::OmgAudio => layout.alternate_root_path(),
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseKind::Esys => write!(f, "ESYS"),
            DatabaseKind::OmgAudio => write!(f, "OMGAUDIO"),
        }
    }
}

/// A track to be written to the device
#[derive(Debug, Clone)]
pub struct TrackImport {
    /// Raw MP3 bytes, tag block included
    pub data: Bytes,
    pub duration_ms: u32,
    pub frame_count: u32,
    /// Display file name; composed from the tags when absent
    pub file_name: Option<String>,
}

impl TrackImport {
    pub fn new(data: impl Into<Bytes>, duration_ms: u32, frame_count: u32) -> Self {
        Self {
            data: data.into(),
            duration_ms,
            frame_count,
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

/// Operations every supported catalog format provides
///
/// Implementations are not re-entrant: callers must serialize access, with
/// at most one mutating call in flight per instance.
#[async_trait]
pub trait DeviceDatabase: Send + Sync {
    fn kind(&self) -> DatabaseKind;

    /// Folders and their tracks, in stored order
    async fn folders(&self) -> Result<Vec<Folder>>;

    /// Replace the whole folder and track arrangement
    ///
    /// The previous file is backed up before the new one is written. On error
    /// the in-memory state is left as it was.
    async fn set_folders(&mut self, folders: &[Folder]) -> Result<()>;

    /// Reserve the smallest unused track id
    async fn next_track_id(&mut self) -> Result<TrackId>;

    /// Raw audio for track `id`
    async fn read_track_file(&self, id: TrackId) -> Result<Bytes>;

    /// Store raw audio as track `id` and describe it
    ///
    /// The track is not listed in any folder until the next
    /// [`set_folders`](Self::set_folders).
    async fn write_track_file(
        &self,
        id: TrackId,
        data: &[u8],
        duration_ms: u32,
        frame_count: u32,
        file_name: Option<&str>,
    ) -> Result<Track>;

    async fn delete_track_file(&self, id: TrackId) -> Result<()>;

    /// Write a batch of tracks, skipping the ones that fail
    ///
    /// Each item gets a fresh id. Failures are logged and do not stop the
    /// rest of the batch; the returned tracks are the ones that were written.
    async fn import_tracks(&mut self, imports: Vec<TrackImport>) -> Vec<Track> {
        let total = imports.len();
        let mut written = Vec::with_capacity(total);

        for (index, import) in imports.into_iter().enumerate() {
            let id = match self.next_track_id().await {
                Ok(id) => id,
                Err(CoreError::Library(LibraryError::IdSpaceExhausted)) => {
                    warn!(remaining = total - index, "No track ids left, stopping import");
                    break;
                }
                Err(e) => {
                    warn!(index, error = %e, "Failed to allocate track id, skipping");
                    continue;
                }
            };

            match self
                .write_track_file(
                    id,
                    &import.data,
                    import.duration_ms,
                    import.frame_count,
                    import.file_name.as_deref(),
                )
                .await
            {
                Ok(track) => written.push(track),
                Err(e) => warn!(index, track_id = %id, error = %e, "Failed to import track, skipping"),
            }
        }

        info!(written = written.len(), total, "Imported tracks");
        written
    }
}

/// Find which catalog format the device carries
///
/// # Errors
///
/// [`CoreError::InvalidFolder`] when no variant's marker directory exists.
pub async fn detect(storage: &dyn DeviceStorage, layout: &DeviceLayout) -> Result<DatabaseKind> {
    for kind in DatabaseKind::PRIORITY {
        let marker = kind.marker(layout);
        if storage.directory_exists(&marker).await? {
            debug!(%kind, "Detected database variant");
            return Ok(kind);
        }
    }

    Err(CoreError::InvalidFolder(format!(
        "{} or {}",
        layout.root_dir, layout.alternate_root_dir
    )))
}

/// Detect the catalog format and open it
pub async fn open_device(config: &CoreConfig) -> Result<Box<dyn DeviceDatabase>> {
    match detect(config.storage.as_ref(), &config.layout).await? {
        DatabaseKind::Esys => Ok(Box::new(EsysDatabase::open(config).await?)),
        DatabaseKind::OmgAudio => Err(CoreError::NotImplemented(format!(
            "{} database",
            DatabaseKind::OmgAudio
        ))),
    }
}
