//! # Container Error Types

use thiserror::Error;

/// Errors that can occur while encoding or decoding a track container.
#[derive(Error, Debug)]
pub enum ContainerError {
    /// Container is shorter than its fixed header.
    #[error("Container truncated: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// Container does not start with the expected tag.
    #[error("Invalid container tag: {0:02X?}")]
    InvalidTag([u8; 4]),

    /// Payload does not fit the 32-bit size field.
    #[error("Payload of {0} bytes is too large for a container")]
    PayloadTooLarge(usize),
}

pub type Result<T> = std::result::Result<T, ContainerError>;
