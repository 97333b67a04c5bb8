//! # Metadata Module
//!
//! Reads, strips and synthesizes the ID3v2 text tags found at the start of
//! raw MP3 streams.
//!
//! ## Overview
//!
//! This module handles:
//! - Locating a tag block inside a byte buffer (v2.2, v2.3 and v2.4)
//! - Decoding text frames into a [`TagSet`](tags::TagSet)
//! - Removing the tag block so only audio frames reach the device
//! - Prepending a minimal v2.3 block when a track is copied back off the device
//!
//! Everything here is a pure transform over byte slices.

pub mod error;
pub mod frames;
pub mod tags;

pub use error::{MetadataError, Result};
pub use frames::TagKey;
pub use tags::{add_tags, locate, read_tags, strip_tags, TagSet};
