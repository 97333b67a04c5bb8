//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the device core and whatever gives
//! it access to a mounted player. The core never touches a file system
//! directly: it asks a [`DeviceStorage`](storage::DeviceStorage) for whole-file
//! reads and writes of named entries relative to the device root.
//!
//! ## Traits
//!
//! - [`DeviceStorage`](storage::DeviceStorage) - Directory probing, whole-file
//!   read/write and delete against a mounted device
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Implemented |
//! | Web      | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Platform
//! implementations should:
//!
//! - Convert platform-specific errors to `BridgeError`
//! - Report missing entries as [`BridgeError::NotFound`] with the requested path
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so a single storage handle
//! can be shared through an `Arc` by the service layer.
//!
//! ## Examples
//!
//! ```ignore
//! use bridge_traits::storage::DeviceStorage;
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//! use bytes::Bytes;
//! use std::path::Path;
//!
//! pub struct MyStorage;
//!
//! #[async_trait]
//! impl DeviceStorage for MyStorage {
//!     async fn read_file(&self, path: &Path) -> Result<Bytes> {
//!         // Implementation
//!         todo!()
//!     }
//!     // ...
//! }
//! ```

pub mod error;
pub mod storage;

pub use error::BridgeError;
pub use storage::DeviceStorage;
