//! Workspace entry crate.
//!
//! This crate exposes feature flags that map to the individual workspace
//! crates. Host applications can depend on `mp3-manager-workspace` and enable
//! the documented features without wiring each crate individually:
//!
//! - `desktop-shims` (default): the service façade with tokio-backed device
//!   storage
//! - `service`: the service façade only; hosts bring their own storage
//! - `codecs`: the synchronous tag, container and database codecs

#[cfg(feature = "codecs")]
pub use core_container as container;
#[cfg(feature = "codecs")]
pub use core_library as library;
#[cfg(feature = "codecs")]
pub use core_metadata as metadata;
#[cfg(any(feature = "service", feature = "desktop-shims"))]
pub use core_runtime as runtime;
#[cfg(any(feature = "service", feature = "desktop-shims"))]
pub use core_service as service;
