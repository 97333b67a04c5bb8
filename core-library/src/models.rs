//! Domain models for the device catalog
//!
//! Values returned to callers are independent copies; nothing here refers
//! back into the database buffer they were read from.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ID Types
// =============================================================================

/// Numeric track identifier, unique across the whole database
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub u16);

impl TrackId {
    pub fn get(self) -> u16 {
        self.0
    }
}

impl From<u16> for TrackId {
    fn from(id: u16) -> Self {
        Self(id)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Positional folder identifier
///
/// Assigned from the folder's slot when reading and never persisted, so it
/// may change after the folder list is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(pub u32);

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// A track as listed in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    /// Display name (the title slot)
    pub name: String,
    pub artist: String,
    /// File name shown to the user, e.g. `Artist - Title.mp3`
    pub file: String,
}

impl Track {
    pub fn new(
        id: TrackId,
        name: impl Into<String>,
        artist: impl Into<String>,
        file: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            artist: artist.into(),
            file: file.into(),
        }
    }
}

/// A folder and its ordered tracks
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub tracks: Vec<Track>,
}

impl Folder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: FolderId::default(),
            name: name.into(),
            tracks: Vec::new(),
        }
    }

    pub fn with_tracks(mut self, tracks: Vec<Track>) -> Self {
        self.tracks = tracks;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
