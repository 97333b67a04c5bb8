//! Frame identifiers and frame headers
//!
//! ID3v2.2 uses three-character frame identifiers and six-byte frame headers;
//! v2.3 and v2.4 use four-character identifiers and ten-byte headers with two
//! flag bytes whose bit assignments differ between the two versions.

use std::fmt;

use crate::tags::decode_syncsafe;

macro_rules! tag_keys {
    ($($key:ident => $id:literal, $legacy:expr, $name:literal;)+) => {
        /// Text fields understood by the tag engine
        ///
        /// The declaration order is the order in which frames are written by
        /// [`add_tags`](crate::tags::add_tags).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum TagKey {
            $($key,)+
        }

        impl TagKey {
            pub const ALL: &'static [TagKey] = &[$(TagKey::$key,)+];

            /// Four-character identifier used by v2.3 and v2.4
            pub fn frame_id(self) -> &'static str {
                match self {
                    $(TagKey::$key => $id,)+
                }
            }

            /// Three-character identifier used by v2.2, when the field existed there
            pub fn legacy_frame_id(self) -> Option<&'static str> {
                match self {
                    $(TagKey::$key => $legacy,)+
                }
            }

            /// Semantic name, e.g. `title`
            pub fn name(self) -> &'static str {
                match self {
                    $(TagKey::$key => $name,)+
                }
            }
        }
    };
}

tag_keys! {
    Title => "TIT2", Some("TT2"), "title";
    Artist => "TPE1", Some("TP1"), "artist";
    Album => "TALB", Some("TAL"), "album";
    AlbumArtist => "TPE2", Some("TP2"), "albumArtist";
    Composer => "TCOM", Some("TCM"), "composer";
    Conductor => "TPE3", Some("TP3"), "conductor";
    RemixArtist => "TPE4", Some("TP4"), "remixArtist";
    Genre => "TCON", Some("TCO"), "genre";
    Year => "TYER", Some("TYE"), "year";
    RecordingTime => "TDRC", None, "recordingTime";
    TrackNumber => "TRCK", Some("TRK"), "trackNumber";
    PartOfSet => "TPOS", Some("TPA"), "partOfSet";
    ContentGroup => "TIT1", Some("TT1"), "contentGroup";
    Subtitle => "TIT3", Some("TT3"), "subtitle";
    Bpm => "TBPM", Some("TBP"), "bpm";
    Copyright => "TCOP", Some("TCR"), "copyright";
    Publisher => "TPUB", Some("TPB"), "publisher";
    EncodedBy => "TENC", Some("TEN"), "encodedBy";
    EncodingSettings => "TSSE", Some("TSS"), "encodingSettings";
    Language => "TLAN", Some("TLA"), "language";
    Length => "TLEN", Some("TLE"), "length";
    Isrc => "TSRC", Some("TRC"), "isrc";
    OriginalArtist => "TOPE", Some("TOA"), "originalArtist";
    OriginalTitle => "TOAL", Some("TOT"), "originalTitle";
    TextWriter => "TEXT", None, "textWriter";
    OriginalTextWriter => "TOLY", Some("TOL"), "originalTextWriter";
    InvolvedPeople => "TIPL", None, "involvedPeopleList";
    MusicianCredits => "TMCL", None, "musicianCreditsList";
    Date => "TDAT", Some("TDA"), "date";
    Time => "TIME", Some("TIM"), "time";
    RecordingDates => "TRDA", Some("TRD"), "recordingDates";
    OriginalYear => "TORY", Some("TOR"), "originalYear";
    OriginalReleaseTime => "TDOR", None, "originalReleaseTime";
    ReleaseTime => "TDRL", None, "releaseTime";
    EncodingTime => "TDEN", None, "encodingTime";
    TaggingTime => "TDTG", None, "taggingTime";
    PlaylistDelay => "TDLY", Some("TDY"), "playlistDelay";
    InitialKey => "TKEY", Some("TKE"), "initialKey";
    Mood => "TMOO", None, "mood";
    FileType => "TFLT", Some("TFT"), "fileType";
    MediaType => "TMED", Some("TMT"), "mediaType";
    OriginalFilename => "TOFN", Some("TOF"), "originalFilename";
    FileOwner => "TOWN", None, "fileOwner";
    ProducedNotice => "TPRO", None, "producedNotice";
    RadioStationName => "TRSN", None, "internetRadioName";
    RadioStationOwner => "TRSO", None, "internetRadioOwner";
    Size => "TSIZ", Some("TSI"), "size";
    AlbumSortOrder => "TSOA", None, "albumSortOrder";
    PerformerSortOrder => "TSOP", None, "performerSortOrder";
    TitleSortOrder => "TSOT", None, "titleSortOrder";
    SetSubtitle => "TSST", None, "setSubtitle";
}

impl TagKey {
    /// Resolve a frame identifier for the given major version
    pub fn from_frame_id(version: u8, id: &[u8]) -> Option<TagKey> {
        // Only text frames are decoded.
        if id.first() != Some(&b'T') {
            return None;
        }

        TagKey::ALL.iter().copied().find(|key| {
            if version == 2 {
                key.legacy_frame_id().map(str::as_bytes) == Some(id)
            } else {
                key.frame_id().as_bytes() == id
            }
        })
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-frame flags relevant to decoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FrameFlags {
    pub compression: bool,
    pub encryption: bool,
    pub unsynchronisation: bool,
    pub data_length_indicator: bool,
}

impl FrameFlags {
    fn parse(version: u8, format: u8) -> Self {
        match version {
            3 => Self {
                compression: format & 0x80 != 0,
                encryption: format & 0x40 != 0,
                ..Self::default()
            },
            4 => Self {
                compression: format & 0x08 != 0,
                encryption: format & 0x04 != 0,
                unsynchronisation: format & 0x02 != 0,
                data_length_indicator: format & 0x01 != 0,
            },
            _ => Self::default(),
        }
    }

    /// Frames whose body cannot be read as plain text
    pub fn is_opaque(&self) -> bool {
        self.compression || self.encryption
    }
}

/// Decoded frame header
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FrameHeader<'a> {
    pub id: &'a [u8],
    pub size: usize,
    pub flags: FrameFlags,
}

impl<'a> FrameHeader<'a> {
    /// Length of a frame header for the given major version
    pub fn len(version: u8) -> usize {
        if version == 2 {
            6
        } else {
            10
        }
    }

    /// Parse the frame header at the start of `data`
    ///
    /// Returns `None` when `data` is shorter than a header or when a v2.4
    /// frame size is not syncsafe.
    pub fn parse(data: &'a [u8], version: u8) -> Option<Self> {
        let header = data.get(..Self::len(version))?;

        if version == 2 {
            let size = (usize::from(header[3]) << 16)
                | (usize::from(header[4]) << 8)
                | usize::from(header[5]);
            return Some(Self {
                id: &header[..3],
                size,
                flags: FrameFlags::default(),
            });
        }

        let size_bytes = [header[4], header[5], header[6], header[7]];
        let size = if version == 4 {
            decode_syncsafe(size_bytes).ok()? as usize
        } else {
            u32::from_be_bytes(size_bytes) as usize
        };

        Some(Self {
            id: &header[..4],
            size,
            flags: FrameFlags::parse(version, header[9]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_id_lookup_per_version() {
        assert_eq!(TagKey::from_frame_id(3, b"TIT2"), Some(TagKey::Title));
        assert_eq!(TagKey::from_frame_id(4, b"TPE1"), Some(TagKey::Artist));
        assert_eq!(TagKey::from_frame_id(2, b"TT2"), Some(TagKey::Title));
        assert_eq!(TagKey::from_frame_id(2, b"TIT2"), None);
        assert_eq!(TagKey::from_frame_id(3, b"TT2"), None);
        assert_eq!(TagKey::from_frame_id(4, b"TDRC"), Some(TagKey::RecordingTime));
    }

    #[test]
    fn test_non_text_frames_are_unknown() {
        assert_eq!(TagKey::from_frame_id(3, b"APIC"), None);
        assert_eq!(TagKey::from_frame_id(3, b"COMM"), None);
        assert_eq!(TagKey::from_frame_id(3, b"TXXX"), None);
    }

    #[test]
    fn test_identifiers_are_unique() {
        assert_eq!(TagKey::ALL.len(), 51);
        assert_eq!(
            TagKey::ALL.iter().filter_map(|key| key.legacy_frame_id()).count(),
            34
        );

        for (i, a) in TagKey::ALL.iter().enumerate() {
            assert_eq!(a.frame_id().len(), 4);
            assert!(a.legacy_frame_id().map_or(true, |id| id.len() == 3));
            for b in &TagKey::ALL[i + 1..] {
                assert_ne!(a.frame_id(), b.frame_id());
                assert_ne!(a.name(), b.name());
                if let (Some(x), Some(y)) = (a.legacy_frame_id(), b.legacy_frame_id()) {
                    assert_ne!(x, y);
                }
            }
        }
    }

    #[test]
    fn test_extended_identifiers() {
        assert_eq!(TagKey::from_frame_id(3, b"TKEY"), Some(TagKey::InitialKey));
        assert_eq!(TagKey::from_frame_id(2, b"TKE"), Some(TagKey::InitialKey));
        assert_eq!(TagKey::from_frame_id(4, b"TSOP"), Some(TagKey::PerformerSortOrder));
        assert_eq!(TagKey::from_frame_id(2, b"TOF"), Some(TagKey::OriginalFilename));
        assert_eq!(TagKey::from_frame_id(2, b"TMOO"), None);
        assert_eq!(TagKey::Mood.legacy_frame_id(), None);
    }

    #[test]
    fn test_parse_v3_header_uses_raw_size() {
        let data = [b'T', b'I', b'T', b'2', 0x00, 0x00, 0x01, 0x00, 0x00, 0x40];
        let header = FrameHeader::parse(&data, 3).unwrap();
        assert_eq!(header.id, b"TIT2");
        assert_eq!(header.size, 256);
        assert!(header.flags.encryption);
        assert!(header.flags.is_opaque());
    }

    #[test]
    fn test_parse_v4_header_uses_syncsafe_size() {
        let data = [b'T', b'I', b'T', b'2', 0x00, 0x00, 0x02, 0x00, 0x00, 0x03];
        let header = FrameHeader::parse(&data, 4).unwrap();
        assert_eq!(header.size, 256);
        assert!(header.flags.unsynchronisation);
        assert!(header.flags.data_length_indicator);
        assert!(!header.flags.is_opaque());

        let bad = [b'T', b'I', b'T', b'2', 0x00, 0x00, 0x80, 0x00, 0x00, 0x00];
        assert_eq!(FrameHeader::parse(&bad, 4), None);
    }

    #[test]
    fn test_parse_v2_header() {
        let data = [b'T', b'T', b'2', 0x00, 0x01, 0x02];
        let header = FrameHeader::parse(&data, 2).unwrap();
        assert_eq!(header.id, b"TT2");
        assert_eq!(header.size, 258);
        assert_eq!(FrameHeader::parse(&data[..5], 2), None);
    }

    #[test]
    fn test_display_uses_semantic_name() {
        assert_eq!(TagKey::Title.to_string(), "title");
        assert_eq!(TagKey::AlbumArtist.to_string(), "albumArtist");
    }
}
