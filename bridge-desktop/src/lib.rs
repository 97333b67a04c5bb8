//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! A portable player shows up on the desktop as a mounted mass-storage
//! volume, so the only bridge needed here is a `DeviceStorage` backed by
//! `tokio::fs` and rooted at that mount point.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::TokioDeviceStorage;
//! use bridge_traits::DeviceStorage;
//!
//! #[tokio::main]
//! async fn main() {
//!     let storage = TokioDeviceStorage::new("/media/WALKMAN");
//!
//!     // Use in core configuration
//! }
//! ```

mod filesystem;

pub use filesystem::TokioDeviceStorage;
