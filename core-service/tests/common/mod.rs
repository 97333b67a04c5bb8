//! Shared fixtures for the service integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::DeviceStorage;
use bytes::Bytes;
use core_library::{write_folders, DatabaseHeader, Folder, Track, TrackId};
use core_metadata::{add_tags, TagKey, TagSet};
use core_runtime::config::CoreConfig;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const SERIAL: u32 = 0x1122_3344;
pub const TIMESTAMP: u32 = 0x5F3E_1A2B;
pub const DATABASE: &str = "ESYS/PBLIST1.DAT";
pub const BACKUP: &str = "ESYS/PBLIST0.DAT";

/// Device storage held in memory
#[derive(Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<PathBuf, Bytes>>,
    dirs: Mutex<HashSet<PathBuf>>,
    writes: Mutex<Vec<PathBuf>>,
    failing: Mutex<HashSet<PathBuf>>,
}

impl MemoryStorage {
    pub fn insert_file(&self, path: &str, data: impl Into<Bytes>) {
        self.files
            .lock()
            .unwrap()
            .insert(PathBuf::from(path), data.into());
    }

    pub fn insert_dir(&self, path: &str) {
        self.dirs.lock().unwrap().insert(PathBuf::from(path));
    }

    pub fn file(&self, path: &str) -> Option<Bytes> {
        self.files.lock().unwrap().get(Path::new(path)).cloned()
    }

    pub fn has_dir(&self, path: &str) -> bool {
        self.dirs.lock().unwrap().contains(Path::new(path))
    }

    /// Paths written so far, in order
    pub fn writes(&self) -> Vec<PathBuf> {
        self.writes.lock().unwrap().clone()
    }

    /// Make every later write to `path` fail
    pub fn fail_writes_to(&self, path: &str) {
        self.failing.lock().unwrap().insert(PathBuf::from(path));
    }
}

#[async_trait]
impl DeviceStorage for MemoryStorage {
    async fn directory_exists(&self, path: &Path) -> BridgeResult<bool> {
        Ok(self.dirs.lock().unwrap().contains(path))
    }

    async fn ensure_directory(&self, path: &Path) -> BridgeResult<()> {
        self.dirs.lock().unwrap().insert(path.to_path_buf());
        Ok(())
    }

    async fn read_file(&self, path: &Path) -> BridgeResult<Bytes> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| BridgeError::NotFound(path.to_path_buf()))
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> BridgeResult<()> {
        if self.failing.lock().unwrap().contains(path) {
            return Err(BridgeError::OperationFailed(format!(
                "write to {} refused",
                path.display()
            )));
        }
        self.writes.lock().unwrap().push(path.to_path_buf());
        self.files.lock().unwrap().insert(path.to_path_buf(), data);
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> BridgeResult<()> {
        self.files
            .lock()
            .unwrap()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| BridgeError::NotFound(path.to_path_buf()))
    }
}

pub fn track(id: u16, name: &str, artist: &str) -> Track {
    Track::new(
        TrackId(id),
        name,
        artist,
        format!("{} - {}.mp3", artist, name),
    )
}

pub fn sample_folders() -> Vec<Folder> {
    vec![
        Folder::new("Rock").with_tracks(vec![
            track(1, "Paranoid", "Black Sabbath"),
            track(2, "Highway Star", "Deep Purple"),
        ]),
        Folder::new("Empty"),
        Folder::new("Jazz").with_tracks(vec![track(4, "So What", "Miles Davis")]),
    ]
}

pub fn database_bytes(folders: &[Folder]) -> Vec<u8> {
    let header = DatabaseHeader::new(0, 0, TIMESTAMP, SERIAL);
    write_folders(&header, folders).unwrap()
}

/// A device with an ESYS database holding `folders`
pub fn device(folders: &[Folder]) -> Arc<MemoryStorage> {
    let storage = Arc::new(MemoryStorage::default());
    storage.insert_dir("ESYS");
    storage.insert_file(DATABASE, database_bytes(folders));
    storage
}

pub fn config(storage: Arc<MemoryStorage>) -> CoreConfig {
    CoreConfig::builder().storage(storage).build().unwrap()
}

/// Fake MPEG audio, free of tag markers
pub fn audio(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 200) as u8 + 0x30).collect()
}

/// `audio` behind a v2.3 tag block
pub fn tagged(title: &str, artist: &str, audio: &[u8]) -> Vec<u8> {
    let tags: TagSet = [(TagKey::Title, title), (TagKey::Artist, artist)]
        .into_iter()
        .collect();
    add_tags(audio, &tags)
}
