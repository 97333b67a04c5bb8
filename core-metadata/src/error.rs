use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Invalid encoded size: {0:02X?} has a byte with the high bit set")]
    InvalidEncodedSize([u8; 4]),
}

pub type Result<T> = std::result::Result<T, MetadataError>;
