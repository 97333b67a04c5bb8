//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the device core:
//! - Logging and tracing infrastructure
//! - Configuration management (device layout, storage injection)
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the service layer depends
//! on. The codec crates stay free of it: they only emit `tracing` events and
//! leave subscriber setup to whoever hosts them.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
