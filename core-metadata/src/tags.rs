//! ID3v2 tag block handling
//!
//! ## Overview
//!
//! A tag block starts with a ten-byte header:
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 3 | `ID3` |
//! | 3 | 1 | major version (2, 3 or 4) |
//! | 4 | 1 | revision (always 0) |
//! | 5 | 1 | flags |
//! | 6 | 4 | syncsafe size of everything after the header |
//!
//! followed by an optional extended header and a sequence of frames, then
//! zero padding. Only text frames are decoded; everything else is skipped.
//!
//! Parsing is forgiving: a frame that claims more bytes than the block holds
//! ends the walk and whatever was decoded up to that point is returned.

use std::collections::btree_map::{self, BTreeMap};

use tracing::{debug, warn};

use crate::error::{MetadataError, Result};
use crate::frames::{FrameHeader, TagKey};

/// Marker opening every tag block
pub const TAG_MARKER: &[u8; 3] = b"ID3";

/// Size of the tag block header
pub const TAG_HEADER_SIZE: usize = 10;

/// Major version written by [`add_tags`]
const WRITE_VERSION: u8 = 3;

/// Largest value a four-byte syncsafe integer can hold
const SYNCSAFE_MAX: usize = (1 << 28) - 1;

/// Text values keyed by [`TagKey`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    values: BTreeMap<TagKey, String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: TagKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    /// Set a value, returning the previous one
    pub fn insert(&mut self, key: TagKey, value: impl Into<String>) -> Option<String> {
        self.values.insert(key, value.into())
    }

    pub fn remove(&mut self, key: TagKey) -> Option<String> {
        self.values.remove(&key)
    }

    pub fn title(&self) -> Option<&str> {
        self.get(TagKey::Title)
    }

    pub fn artist(&self) -> Option<&str> {
        self.get(TagKey::Artist)
    }

    pub fn album(&self) -> Option<&str> {
        self.get(TagKey::Album)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, TagKey, String> {
        self.values.iter()
    }
}

impl<V: Into<String>> FromIterator<(TagKey, V)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (TagKey, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = (&'a TagKey, &'a String);
    type IntoIter = btree_map::Iter<'a, TagKey, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Flags from byte 5 of the tag header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagHeaderFlags {
    pub unsynchronisation: bool,
    pub extended_header: bool,
    pub experimental: bool,
    pub footer: bool,
}

impl TagHeaderFlags {
    fn parse(version: u8, flags: u8) -> Self {
        match version {
            3 | 4 => Self {
                unsynchronisation: flags & 0x80 != 0,
                extended_header: flags & 0x40 != 0,
                experimental: flags & 0x20 != 0,
                footer: version == 4 && flags & 0x10 != 0,
            },
            _ => Self::default(),
        }
    }
}

/// Decoded tag block header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHeader {
    pub version: u8,
    pub flags: TagHeaderFlags,
    /// Size of the block after the ten-byte header
    pub size: u32,
}

impl TagHeader {
    /// Parse a header at the start of `data`, returning `None` unless it is a
    /// valid, supported tag header
    pub fn parse(data: &[u8]) -> Option<Self> {
        let header = data.get(..TAG_HEADER_SIZE)?;
        if &header[..3] != TAG_MARKER {
            return None;
        }

        let version = header[3];
        if !matches!(version, 2..=4) || header[4] != 0 {
            return None;
        }

        let size = decode_syncsafe([header[6], header[7], header[8], header[9]]).ok()?;
        Some(Self {
            version,
            flags: TagHeaderFlags::parse(version, header[5]),
            size,
        })
    }
}

/// Whether every byte has its high bit clear
pub fn is_syncsafe(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| b & 0x80 == 0)
}

/// Decode a 28-bit integer stored seven bits per byte, most significant first
pub fn decode_syncsafe(bytes: [u8; 4]) -> Result<u32> {
    if !is_syncsafe(&bytes) {
        return Err(MetadataError::InvalidEncodedSize(bytes));
    }

    Ok((u32::from(bytes[0]) << 21)
        + (u32::from(bytes[1]) << 14)
        + (u32::from(bytes[2]) << 7)
        + u32::from(bytes[3]))
}

/// Encode a value below 2^28 as a syncsafe integer
pub fn encode_syncsafe(value: u32) -> [u8; 4] {
    [
        ((value >> 21) & 0x7F) as u8,
        ((value >> 14) & 0x7F) as u8,
        ((value >> 7) & 0x7F) as u8,
        (value & 0x7F) as u8,
    ]
}

/// Find the offset of the first valid tag header in `buffer`
///
/// Candidate markers whose version, revision or size field is invalid are
/// skipped and the scan continues after them.
pub fn locate(buffer: &[u8]) -> Option<usize> {
    let mut from = 0;
    while let Some(found) = buffer
        .get(from..)?
        .windows(TAG_MARKER.len())
        .position(|window| window == TAG_MARKER)
    {
        let candidate = from + found;
        if TagHeader::parse(&buffer[candidate..]).is_some() {
            return Some(candidate);
        }
        from = candidate + 1;
    }
    None
}

/// Decode the text frames of the first tag block in `buffer`
///
/// Returns an empty set when there is no tag block.
pub fn read_tags(buffer: &[u8]) -> TagSet {
    let mut tags = TagSet::new();

    let Some(position) = locate(buffer) else {
        return tags;
    };
    let Some(header) = TagHeader::parse(&buffer[position..]) else {
        return tags;
    };

    let tag_end = (position + TAG_HEADER_SIZE)
        .saturating_add(header.size as usize)
        .min(buffer.len());
    let mut body_start = position + TAG_HEADER_SIZE;

    if header.flags.extended_header {
        match extended_header_len(&buffer[body_start..tag_end], header.version) {
            Some(len) => body_start = body_start.saturating_add(len),
            None => {
                warn!(position, "Unreadable extended tag header");
                return tags;
            }
        }
    }

    if body_start >= tag_end {
        return tags;
    }

    walk_frames(&buffer[body_start..tag_end], header.version, &mut tags);
    debug!(
        position,
        version = header.version,
        fields = tags.len(),
        "Read tag block"
    );
    tags
}

/// Length of the extended header at the start of the tag body
fn extended_header_len(body: &[u8], version: u8) -> Option<usize> {
    let size: [u8; 4] = body.get(..4)?.try_into().ok()?;
    match version {
        // v2.3 stores the size excluding the size field itself
        3 => Some(4 + u32::from_be_bytes(size) as usize),
        4 => decode_syncsafe(size).ok().map(|len| len as usize),
        _ => Some(0),
    }
}

fn walk_frames(body: &[u8], version: u8, tags: &mut TagSet) {
    let header_len = FrameHeader::len(version);
    let mut cursor = 0;

    while cursor < body.len() && body[cursor] != 0 {
        let Some(frame) = FrameHeader::parse(&body[cursor..], version) else {
            warn!(cursor, "Unreadable frame header, stopping");
            break;
        };

        let remaining = body.len() - cursor;
        if frame.size.saturating_add(header_len) > remaining {
            warn!(
                cursor,
                frame_size = frame.size,
                remaining,
                "Frame exceeds tag block, stopping"
            );
            break;
        }

        if !frame.flags.is_opaque() {
            if let Some(key) = TagKey::from_frame_id(version, frame.id) {
                let start = cursor + header_len;
                let mut content = &body[start..start + frame.size];
                if frame.flags.data_length_indicator {
                    content = content.get(4..).unwrap_or_default();
                }

                let text = if frame.flags.unsynchronisation {
                    decode_text(&resynchronise(content))
                } else {
                    decode_text(content)
                };
                tags.insert(key, text);
            }
        }

        cursor += header_len + frame.size;
    }
}

/// Collapse every `0xFF 0x00` pair to a single `0xFF`
fn resynchronise(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for (i, &byte) in data.iter().enumerate() {
        if byte == 0x00 && i > 0 && data[i - 1] == 0xFF {
            continue;
        }
        out.push(byte);
    }
    out
}

/// Decode a text frame body one byte per character
///
/// NUL and 0x03 bytes are dropped wherever they occur, which removes the
/// Latin-1 and UTF-8 encoding markers along with terminators.
fn decode_text(content: &[u8]) -> String {
    content
        .iter()
        .filter(|&&b| b != 0x00 && b != 0x03)
        .map(|&b| char::from(b))
        .collect()
}

/// Encode text one byte per character; characters outside Latin-1 become `?`
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Remove the first tag block from `buffer`
///
/// Exactly `10 + size` bytes are removed starting at the marker; the bytes
/// before and after it are kept untouched. Without a tag block the input is
/// returned unchanged.
///
/// # Errors
///
/// [`MetadataError::InvalidEncodedSize`] if the size field is not syncsafe.
pub fn strip_tags(buffer: &[u8]) -> Result<Vec<u8>> {
    let Some(position) = locate(buffer) else {
        return Ok(buffer.to_vec());
    };

    let size_field = &buffer[position + 6..position + TAG_HEADER_SIZE];
    let size = decode_syncsafe([size_field[0], size_field[1], size_field[2], size_field[3]])?;
    let end = (position + TAG_HEADER_SIZE)
        .saturating_add(size as usize)
        .min(buffer.len());

    let mut out = Vec::with_capacity(buffer.len() - (end - position));
    out.extend_from_slice(&buffer[..position]);
    out.extend_from_slice(&buffer[end..]);
    debug!(position, removed = end - position, "Stripped tag block");
    Ok(out)
}

/// Prepend a minimal v2.3 tag block holding `tags` to `buffer`
///
/// Each value becomes one text frame with a Latin-1 encoding marker.
pub fn add_tags(buffer: &[u8], tags: &TagSet) -> Vec<u8> {
    let mut frames = Vec::new();

    for (key, value) in tags {
        let text = encode_text(value);
        let frame_size = text.len() + 1;
        if frames.len() + 10 + frame_size > SYNCSAFE_MAX {
            warn!(field = %key, "Tag value does not fit in a tag block, skipping");
            continue;
        }

        frames.extend_from_slice(key.frame_id().as_bytes());
        frames.extend_from_slice(&(frame_size as u32).to_be_bytes());
        frames.extend_from_slice(&[0x00, 0x00]);
        frames.push(0x00);
        frames.extend_from_slice(&text);
    }

    let mut out = Vec::with_capacity(TAG_HEADER_SIZE + frames.len() + buffer.len());
    out.extend_from_slice(TAG_MARKER);
    out.extend_from_slice(&[WRITE_VERSION, 0x00, 0x00]);
    out.extend_from_slice(&encode_syncsafe(frames.len() as u32));
    out.extend_from_slice(&frames);
    out.extend_from_slice(buffer);
    out
}
