//! ESYS playlist database
//!
//! Owns the loaded database file between persists. The buffer is never
//! patched in place: [`set_folders`](DeviceDatabase::set_folders) builds a
//! complete new file, writes it to the device, then adopts it.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use bridge_traits::DeviceStorage;
use core_container::{decode_container, encode_container};
use core_library::{
    find_track, parse_header, read_folders, read_track_ids, verify_checksum, write_folders,
    DatabaseHeader, Folder, Track, TrackId, TrackIdAllocator,
};
use core_metadata::{add_tags, read_tags, strip_tags, TagKey, TagSet};
use core_runtime::config::{CoreConfig, DeviceLayout};

use crate::detector::{DatabaseKind, DeviceDatabase};
use crate::error::{CoreError, Result};

const UNKNOWN_TITLE: &str = "Unknown Title";
const UNKNOWN_ARTIST: &str = "Unknown Artist";

pub struct EsysDatabase {
    storage: Arc<dyn DeviceStorage>,
    layout: DeviceLayout,
    embed_tags_on_read: bool,
    header: DatabaseHeader,
    buffer: Bytes,
    /// Built from the index on first use, dropped whenever the index is replaced
    allocator: Option<TrackIdAllocator>,
}

impl EsysDatabase {
    /// Load the primary database file from the device
    pub async fn open(config: &CoreConfig) -> Result<Self> {
        let path = config.layout.database_path();
        let data = config
            .storage
            .read_file(&path)
            .await
            .map_err(|source| CoreError::DatabaseIo { file: path, source })?;

        Self::from_bytes(config, data)
    }

    /// Use an already loaded database file
    ///
    /// # Errors
    ///
    /// Fails when the signature or the header checksum is wrong.
    pub fn from_bytes(config: &CoreConfig, data: Bytes) -> Result<Self> {
        let header = parse_header(&data)?;
        info!(
            folders = header.folder_count,
            tracks = header.track_count,
            serial = header.serial_number,
            "Opened ESYS database"
        );

        Ok(Self {
            storage: Arc::clone(&config.storage),
            layout: config.layout.clone(),
            embed_tags_on_read: config.embed_tags_on_read,
            header,
            buffer: data,
            allocator: None,
        })
    }

    pub fn header(&self) -> &DatabaseHeader {
        &self.header
    }

    /// Device serial number, the key material of every track container
    pub fn serial_number(&self) -> u32 {
        self.header.serial_number
    }

    /// The database file as currently held in memory
    pub fn as_bytes(&self) -> &Bytes {
        &self.buffer
    }

    fn allocator(&mut self) -> Result<&mut TrackIdAllocator> {
        let allocator = match self.allocator.take() {
            Some(allocator) => allocator,
            None => {
                let ids = read_track_ids(&self.buffer)?;
                debug!(in_use = ids.len(), "Built track id allocator");
                TrackIdAllocator::from_ids(ids)
            }
        };
        Ok(self.allocator.insert(allocator))
    }

    async fn write_database_file(&self, path: &Path, data: Bytes) -> Result<()> {
        self.storage
            .write_file(path, data)
            .await
            .map_err(|source| CoreError::DatabaseIo {
                file: path.to_path_buf(),
                source,
            })
    }
}

#[async_trait]
impl DeviceDatabase for EsysDatabase {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Esys
    }

    async fn folders(&self) -> Result<Vec<Folder>> {
        Ok(read_folders(&self.buffer)?)
    }

    #[instrument(skip(self, folders), fields(folders = folders.len()))]
    async fn set_folders(&mut self, folders: &[Folder]) -> Result<()> {
        let data = write_folders(&self.header, folders)?;
        verify_checksum(&data)?;
        let header = parse_header(&data)?;
        let data = Bytes::from(data);

        let backup = self.layout.backup_path();
        self.write_database_file(&backup, self.buffer.clone()).await?;
        debug!(path = %backup.display(), "Backed up database");

        let primary = self.layout.database_path();
        self.write_database_file(&primary, data.clone()).await?;

        info!(
            folders = header.folder_count,
            tracks = header.track_count,
            size = data.len(),
            "Saved database"
        );
        self.header = header;
        self.buffer = data;
        self.allocator = None;
        Ok(())
    }

    async fn next_track_id(&mut self) -> Result<TrackId> {
        let id = self.allocator()?.next_id()?;
        debug!(track_id = %id, "Allocated track id");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn read_track_file(&self, id: TrackId) -> Result<Bytes> {
        let path = self.layout.container_path(id.get());
        let container = self
            .storage
            .read_file(&path)
            .await
            .map_err(|source| CoreError::TrackIo { id, source })?;

        let audio = decode_container(&container, id.get(), self.header.serial_number)?;
        if !self.embed_tags_on_read {
            return Ok(audio);
        }

        let Some(track) = find_track(&self.buffer, id)? else {
            debug!("Track not in the index, returning untagged audio");
            return Ok(audio);
        };

        let mut tags = TagSet::new();
        if !track.name.is_empty() {
            tags.insert(TagKey::Title, track.name);
        }
        if !track.artist.is_empty() {
            tags.insert(TagKey::Artist, track.artist);
        }
        if tags.is_empty() {
            return Ok(audio);
        }

        Ok(Bytes::from(add_tags(&audio, &tags)))
    }

    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn write_track_file(
        &self,
        id: TrackId,
        data: &[u8],
        duration_ms: u32,
        frame_count: u32,
        file_name: Option<&str>,
    ) -> Result<Track> {
        let tags = read_tags(data);
        let audio = strip_tags(data)?;
        let container = encode_container(
            &audio,
            id.get(),
            self.header.serial_number,
            duration_ms,
            frame_count,
        )?;

        let data_dir = self.layout.data_path();
        self.storage
            .ensure_directory(&data_dir)
            .await
            .map_err(|source| CoreError::TrackIo { id, source })?;

        let path = self.layout.container_path(id.get());
        self.storage
            .write_file(&path, container)
            .await
            .map_err(|source| CoreError::TrackIo { id, source })?;

        let track = describe_track(id, &tags, file_name, &self.layout.display_extension);
        info!(title = %track.name, artist = %track.artist, "Wrote track");
        Ok(track)
    }

    async fn delete_track_file(&self, id: TrackId) -> Result<()> {
        let path = self.layout.container_path(id.get());
        self.storage
            .delete_file(&path)
            .await
            .map_err(|source| CoreError::TrackIo { id, source })?;
        info!(track_id = %id, "Deleted track");
        Ok(())
    }
}

/// Catalog entry for a freshly written track
///
/// Title falls back to the file name without its extension, then to a
/// placeholder. The display file name defaults to `{artist} - {title}.{ext}`.
fn describe_track(id: TrackId, tags: &TagSet, file_name: Option<&str>, extension: &str) -> Track {
    let file_stem = file_name
        .map(Path::new)
        .and_then(Path::file_stem)
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.trim().is_empty());

    let title = tags
        .title()
        .filter(|title| !title.is_empty())
        .or(file_stem)
        .unwrap_or(UNKNOWN_TITLE)
        .to_string();
    let artist = tags
        .artist()
        .filter(|artist| !artist.is_empty())
        .unwrap_or(UNKNOWN_ARTIST)
        .to_string();

    let file = match file_name {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => format!("{} - {}.{}", artist, title, extension),
    };

    Track::new(id, title, artist, file)
}
