//! Folder table, track id index and track metadata table
//!
//! Offsets are derived from the header counts and never trusted from
//! anywhere else:
//!
//! ```text
//! file_offset  = 32 + folder_count * 256
//! track_offset = file_offset + round_up(track_count * 2, 16)
//! total        = track_offset + track_count * 768
//! ```
//!
//! Each folder entry stores a 252-byte name and the absolute byte offset of
//! its first id in the index, or 0 when the folder has no tracks. A folder's
//! tracks run up to the next non-empty folder's first id, so the table is
//! walked from the last folder backwards.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::{LibraryError, Result};
use crate::header::{DatabaseHeader, HEADER_SIZE};
use crate::models::{Folder, FolderId, Track, TrackId};
use crate::text::{read_text, write_text, FOLDER_NAME_SLOT, TEXT_SLOT};

pub const FOLDER_ENTRY_SIZE: usize = 256;
pub const TRACK_ENTRY_SIZE: usize = 3 * TEXT_SLOT;
pub const INDEX_ALIGNMENT: usize = 16;

/// Round `n` up to the next multiple of `multiple`
pub fn round_up(n: usize, multiple: usize) -> usize {
    n.div_ceil(multiple) * multiple
}

/// Derived positions of every table in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexLayout {
    pub folder_count: usize,
    pub track_count: usize,
    /// Start of the track id index
    pub file_offset: usize,
    /// Start of the track metadata table
    pub track_offset: usize,
}

impl IndexLayout {
    pub fn new(folder_count: usize, track_count: usize) -> Self {
        let file_offset = HEADER_SIZE + folder_count * FOLDER_ENTRY_SIZE;
        let track_offset = file_offset + round_up(track_count * 2, INDEX_ALIGNMENT);
        Self {
            folder_count,
            track_count,
            file_offset,
            track_offset,
        }
    }

    pub fn from_header(header: &DatabaseHeader) -> Self {
        Self::new(header.folder_count as usize, header.track_count as usize)
    }

    /// Exact size of a file with this many folders and tracks
    pub fn total_size(&self) -> usize {
        self.track_offset + self.track_count * TRACK_ENTRY_SIZE
    }

    pub fn folder_entry(&self, index: usize) -> usize {
        HEADER_SIZE + index * FOLDER_ENTRY_SIZE
    }

    pub fn index_entry(&self, position: usize) -> usize {
        self.file_offset + position * 2
    }

    pub fn metadata_entry(&self, position: usize) -> usize {
        self.track_offset + position * TRACK_ENTRY_SIZE
    }

    fn check_len(&self, data: &[u8]) -> Result<()> {
        let expected = self.total_size();
        if data.len() < expected {
            return Err(LibraryError::Truncated {
                expected,
                actual: data.len(),
            });
        }
        Ok(())
    }
}

/// Decode every folder and its tracks, in stored order
pub fn read_folders(data: &[u8]) -> Result<Vec<Folder>> {
    let header = DatabaseHeader::parse(data)?;
    let layout = IndexLayout::from_header(&header);
    layout.check_len(data)?;

    let mut folders = Vec::with_capacity(layout.folder_count);
    let mut boundary = layout.track_count;

    for slot in (0..layout.folder_count).rev() {
        let entry = layout.folder_entry(slot);
        let name = read_text(&data[entry..entry + FOLDER_NAME_SLOT]);
        let offset = read_u32(data, entry + FOLDER_NAME_SLOT) as usize;

        let tracks = if offset == 0 {
            Vec::new()
        } else {
            let from = first_position(&layout, slot, offset, boundary)?;
            let tracks = (from..boundary)
                .map(|position| read_track(data, &layout, position))
                .collect();
            boundary = from;
            tracks
        };

        folders.push(Folder {
            id: FolderId(slot as u32),
            name,
            tracks,
        });
    }

    if boundary > 0 && layout.folder_count > 0 {
        warn!(
            orphaned = boundary,
            "Index entries before the first folder belong to no folder"
        );
    }

    folders.reverse();
    debug!(
        folders = folders.len(),
        tracks = layout.track_count,
        "Read folder table"
    );
    Ok(folders)
}

/// Every id in the track id index, in index order
pub fn read_track_ids(data: &[u8]) -> Result<Vec<TrackId>> {
    let header = DatabaseHeader::parse(data)?;
    let layout = IndexLayout::from_header(&header);
    layout.check_len(data)?;

    Ok((0..layout.track_count)
        .map(|position| TrackId(read_u16(data, layout.index_entry(position))))
        .collect())
}

/// Look up one track by id
///
/// Only the id index is scanned; the metadata slot of the matching entry is
/// the only text decoded.
pub fn find_track(data: &[u8], id: TrackId) -> Result<Option<Track>> {
    let header = DatabaseHeader::parse(data)?;
    let layout = IndexLayout::from_header(&header);
    layout.check_len(data)?;

    let position = (0..layout.track_count)
        .find(|&position| read_u16(data, layout.index_entry(position)) == id.0);
    Ok(position.map(|position| read_track(data, &layout, position)))
}

/// Build a complete database file for `folders`
///
/// The header keeps the timestamp, serial number and reserved word of
/// `header`; only the counts and checksum change. Empty folders store a zero
/// offset.
pub fn write_folders(header: &DatabaseHeader, folders: &[Folder]) -> Result<Vec<u8>> {
    let track_count: usize = folders.iter().map(|folder| folder.tracks.len()).sum();
    validate_tracks(folders)?;

    let folder_count_field = count_field("folders", folders.len())?;
    let track_count_field = count_field("tracks", track_count)?;

    let layout = IndexLayout::new(folders.len(), track_count);
    if u32::try_from(layout.index_entry(track_count)).is_err() {
        return Err(invalid_input(
            "folders",
            "Track index does not fit 32-bit offsets",
        ));
    }

    let mut data = vec![0u8; layout.total_size()];
    let rebuilt = header.with_counts(folder_count_field, track_count_field);
    data[..HEADER_SIZE].copy_from_slice(&rebuilt.to_bytes());

    let mut cursor = 0usize;
    for (slot, folder) in folders.iter().enumerate() {
        let entry = layout.folder_entry(slot);
        write_text(&mut data[entry..entry + FOLDER_NAME_SLOT], &folder.name);

        let offset = if folder.tracks.is_empty() {
            0
        } else {
            layout.index_entry(cursor) as u32
        };
        write_u32(&mut data, entry + FOLDER_NAME_SLOT, offset);
        cursor += folder.tracks.len();
    }

    let tracks = folders.iter().flat_map(|folder| folder.tracks.iter());
    for (position, track) in tracks.enumerate() {
        write_u16(&mut data, layout.index_entry(position), track.id.0);

        let meta = layout.metadata_entry(position);
        write_text(&mut data[meta..meta + TEXT_SLOT], &track.file);
        write_text(&mut data[meta + TEXT_SLOT..meta + 2 * TEXT_SLOT], &track.name);
        write_text(&mut data[meta + 2 * TEXT_SLOT..meta + 3 * TEXT_SLOT], &track.artist);
    }

    debug!(
        folders = folders.len(),
        tracks = track_count,
        size = data.len(),
        "Built folder table"
    );
    Ok(data)
}

/// Translate a folder's stored offset into an index position
fn first_position(layout: &IndexLayout, slot: usize, offset: usize, boundary: usize) -> Result<usize> {
    if offset < layout.file_offset {
        return Err(LibraryError::CorruptIndex(format!(
            "folder {} points at {:#x}, inside the folder table",
            slot, offset
        )));
    }

    let relative = offset - layout.file_offset;
    if relative % 2 != 0 {
        return Err(LibraryError::CorruptIndex(format!(
            "folder {} points at {:#x}, between index entries",
            slot, offset
        )));
    }

    let from = relative / 2;
    if from > boundary {
        return Err(LibraryError::CorruptIndex(format!(
            "folder {} starts at entry {} past the next folder's entry {}",
            slot, from, boundary
        )));
    }
    Ok(from)
}

fn read_track(data: &[u8], layout: &IndexLayout, position: usize) -> Track {
    let id = TrackId(read_u16(data, layout.index_entry(position)));
    let meta = layout.metadata_entry(position);
    Track {
        id,
        file: read_text(&data[meta..meta + TEXT_SLOT]),
        name: read_text(&data[meta + TEXT_SLOT..meta + 2 * TEXT_SLOT]),
        artist: read_text(&data[meta + 2 * TEXT_SLOT..meta + 3 * TEXT_SLOT]),
    }
}

fn validate_tracks(folders: &[Folder]) -> Result<()> {
    let mut seen = HashSet::new();
    for track in folders.iter().flat_map(|folder| folder.tracks.iter()) {
        if track.id.0 == 0 {
            return Err(invalid_input("track.id", "Track id 0 is reserved"));
        }
        if !seen.insert(track.id) {
            return Err(invalid_input(
                "track.id",
                format!("Track id {} appears more than once", track.id),
            ));
        }
    }
    Ok(())
}

fn count_field(field: &str, count: usize) -> Result<u32> {
    u32::try_from(count).map_err(|_| invalid_input(field, format!("{} entries do not fit the header", count)))
}

fn invalid_input(field: &str, message: impl Into<String>) -> LibraryError {
    LibraryError::InvalidInput {
        field: field.to_string(),
        message: message.into(),
    }
}

fn read_u16(data: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([data[at], data[at + 1]])
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

fn write_u16(data: &mut [u8], at: usize, value: u16) {
    data[at..at + 2].copy_from_slice(&value.to_be_bytes());
}

fn write_u32(data: &mut [u8], at: usize, value: u32) {
    data[at..at + 4].copy_from_slice(&value.to_be_bytes());
}
