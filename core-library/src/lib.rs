//! # Device Database Module
//!
//! Reads and rebuilds the player's binary catalog file.
//!
//! ## Overview
//!
//! This module manages:
//! - The 32-byte database header and its XOR checksum ([`header`])
//! - The folder table, track id index and track metadata table ([`index`])
//! - Fixed-width UTF-16BE text slots ([`text`])
//! - Track id allocation ([`allocator`])
//! - The `Folder`/`Track` values handed to callers ([`models`])
//!
//! Everything here is a synchronous transform over byte buffers; reading the
//! file from the device and writing it back is left to the service layer.

pub mod allocator;
pub mod error;
pub mod header;
pub mod index;
pub mod models;
pub mod text;

pub use allocator::TrackIdAllocator;
pub use error::{LibraryError, Result};
pub use header::{parse_header, verify_checksum, write_header, DatabaseHeader};
pub use index::{find_track, read_folders, read_track_ids, write_folders, IndexLayout};
pub use models::{Folder, FolderId, Track, TrackId};
