use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Invalid database file: signature {0:02X?}")]
    InvalidDbFile([u8; 8]),

    #[error("Header checksum mismatch: words XOR to {residue:#010X}")]
    ChecksumMismatch { residue: u32 },

    #[error("Database truncated: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Corrupt track index: {0}")]
    CorruptIndex(String),

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    #[error("No free track id left")]
    IdSpaceExhausted,
}

pub type Result<T> = std::result::Result<T, LibraryError>;
