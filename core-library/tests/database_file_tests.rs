//! Integration tests for the database file codecs
//!
//! These tests build database files byte by byte, the way they appear on a
//! player, and check them against the header, index and allocator APIs.

use core_library::header::SIGNATURE;
use core_library::{
    parse_header, read_folders, read_track_ids, verify_checksum, write_folders, DatabaseHeader,
    Folder, IndexLayout, LibraryError, Track, TrackId, TrackIdAllocator,
};

fn header_bytes(timestamp: u32, serial: u32, folders: u32, tracks: u32) -> Vec<u8> {
    let words = [timestamp, serial, 0, folders, tracks];
    let mut checksum = u32::from_be_bytes(SIGNATURE[..4].try_into().unwrap())
        ^ u32::from_be_bytes(SIGNATURE[4..].try_into().unwrap());
    for word in words {
        checksum ^= word;
    }

    let mut data = SIGNATURE.to_vec();
    for word in words.iter().chain([checksum].iter()) {
        data.extend_from_slice(&word.to_be_bytes());
    }
    data
}

fn utf16_slot(text: &str, width: usize) -> Vec<u8> {
    let mut slot: Vec<u8> = text.encode_utf16().flat_map(u16::to_be_bytes).collect();
    slot.resize(width, 0);
    slot
}

#[test]
fn test_hand_built_header_opens() {
    let data = header_bytes(0x4B1D_0000, 0x0012_3456, 2, 3);
    let header = parse_header(&data).unwrap();
    assert_eq!(header.folder_count, 2);
    assert_eq!(header.track_count, 3);
    assert_eq!(header.serial_number, 0x0012_3456);

    let mut flipped = data.clone();
    flipped[15] ^= 0x01;
    assert!(matches!(
        parse_header(&flipped),
        Err(LibraryError::ChecksumMismatch { .. })
    ));
}

#[test]
fn test_hand_built_file_reads() {
    // Folder "A" holds tracks 10 and 11, folder "B" is empty, folder "C" holds 12.
    let layout = IndexLayout::new(3, 3);
    let mut data = header_bytes(1, 2, 3, 3);

    for (name, offset) in [
        ("A", layout.file_offset as u32),
        ("B", 0),
        ("C", layout.file_offset as u32 + 4),
    ] {
        data.extend(utf16_slot(name, 252));
        data.extend_from_slice(&offset.to_be_bytes());
    }

    let mut index = Vec::new();
    for id in [10u16, 11, 12] {
        index.extend_from_slice(&id.to_be_bytes());
    }
    index.resize(16, 0);
    data.extend(index);

    for (file, title, artist) in [
        ("a.mp3", "Alpha", "X"),
        ("b.mp3", "Beta", "Y"),
        ("c.mp3", "Gamma", "Z"),
    ] {
        data.extend(utf16_slot(file, 256));
        data.extend(utf16_slot(title, 256));
        data.extend(utf16_slot(artist, 256));
    }
    assert_eq!(data.len(), layout.total_size());

    let folders = read_folders(&data).unwrap();
    assert_eq!(folders.len(), 3);
    assert_eq!(
        folders[0].tracks,
        vec![
            Track::new(TrackId(10), "Alpha", "X", "a.mp3"),
            Track::new(TrackId(11), "Beta", "Y", "b.mp3"),
        ]
    );
    assert!(folders[1].tracks.is_empty());
    assert_eq!(folders[2].tracks, vec![Track::new(TrackId(12), "Gamma", "Z", "c.mp3")]);

    let mut allocator = TrackIdAllocator::from_ids(read_track_ids(&data).unwrap());
    assert_eq!(allocator.next_id().unwrap(), TrackId(1));

    // Rewriting the parsed folders reproduces the file byte for byte.
    let header = DatabaseHeader::parse(&data).unwrap();
    assert_eq!(write_folders(&header, &folders).unwrap(), data);
}

#[test]
fn test_large_round_trip() {
    let mut next = 1u16;
    let folders: Vec<Folder> = (0..40)
        .map(|f| {
            let count = (f * 7) % 11;
            let tracks = (0..count)
                .map(|t| {
                    let id = next;
                    next += 3;
                    Track::new(
                        TrackId(id),
                        format!("Track {t}"),
                        format!("Artist {f}"),
                        format!("Artist {f} - Track {t}.mp3"),
                    )
                })
                .collect();
            Folder::new(format!("Folder {f}")).with_tracks(tracks)
        })
        .collect();

    let header = DatabaseHeader::new(0, 0, 0x6000_0000, 0xDEAD_BEEF);
    let data = write_folders(&header, &folders).unwrap();
    assert!(verify_checksum(&data).is_ok());

    let read = read_folders(&data).unwrap();
    assert_eq!(read.len(), folders.len());
    for (read, written) in read.iter().zip(&folders) {
        assert_eq!(read.name, written.name);
        assert_eq!(read.tracks, written.tracks);
    }
}
