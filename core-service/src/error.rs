use std::path::PathBuf;

use bridge_traits::BridgeError;
use core_library::TrackId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid folder: no {0} directory found on the device")]
    InvalidFolder(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Track {id} I/O failed: {source}")]
    TrackIo {
        id: TrackId,
        #[source]
        source: BridgeError,
    },

    #[error("Database I/O failed on {}: {source}", .file.display())]
    DatabaseIo {
        file: PathBuf,
        #[source]
        source: BridgeError,
    },

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Library error: {0}")]
    Library(#[from] core_library::LibraryError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] core_metadata::MetadataError),

    #[error("Container error: {0}")]
    Container(#[from] core_container::ContainerError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
