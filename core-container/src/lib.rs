//! # Track Container Module
//!
//! Wraps raw audio in the container format the player stores on disk.
//!
//! ## Overview
//!
//! - [`cipher`] - per-track, per-device self-inverse byte substitution
//! - [`container`] - 32-byte container header plus the ciphered payload
//!
//! Both are pure transforms; the service layer moves the bytes on and off
//! the device.

pub mod cipher;
pub mod container;
pub mod error;

pub use cipher::CipherTable;
pub use container::{decode_container, encode_container, ContainerHeader};
pub use error::{ContainerError, Result};
