//! Database header codec
//!
//! The header is eight big-endian 32-bit words:
//!
//! | Offset | Field |
//! |---|---|
//! | 0 | signature `WMPLESYS` (two words) |
//! | 8 | timestamp |
//! | 12 | device serial number |
//! | 16 | reserved |
//! | 20 | folder count |
//! | 24 | track count |
//! | 28 | checksum |
//!
//! The checksum is chosen so that all eight words XOR to zero.

use bytes::{Buf, BufMut};
use tracing::debug;

use crate::error::{LibraryError, Result};

pub const SIGNATURE: &[u8; 8] = b"WMPLESYS";
pub const HEADER_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseHeader {
    pub timestamp: u32,
    pub serial_number: u32,
    pub reserved: u32,
    pub folder_count: u32,
    pub track_count: u32,
    pub checksum: u32,
}

impl DatabaseHeader {
    /// Build a header with a freshly computed checksum
    pub fn new(folder_count: u32, track_count: u32, timestamp: u32, serial_number: u32) -> Self {
        let mut header = Self {
            timestamp,
            serial_number,
            reserved: 0,
            folder_count,
            track_count,
            checksum: 0,
        };
        header.checksum = header.compute_checksum();
        header
    }

    /// Same device identity with new counts
    ///
    /// Timestamp, serial number and the reserved word are carried over.
    pub fn with_counts(&self, folder_count: u32, track_count: u32) -> Self {
        let mut header = Self {
            folder_count,
            track_count,
            checksum: 0,
            ..*self
        };
        header.checksum = header.compute_checksum();
        header
    }

    /// Decode the header fields
    ///
    /// Only the signature is checked; see [`verify_checksum`].
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(LibraryError::Truncated {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }

        let mut buf = &data[..HEADER_SIZE];
        let mut signature = [0u8; 8];
        buf.copy_to_slice(&mut signature);
        if &signature != SIGNATURE {
            return Err(LibraryError::InvalidDbFile(signature));
        }

        Ok(Self {
            timestamp: buf.get_u32(),
            serial_number: buf.get_u32(),
            reserved: buf.get_u32(),
            folder_count: buf.get_u32(),
            track_count: buf.get_u32(),
            checksum: buf.get_u32(),
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        let mut out = &mut bytes[..];
        out.put_slice(SIGNATURE);
        out.put_u32(self.timestamp);
        out.put_u32(self.serial_number);
        out.put_u32(self.reserved);
        out.put_u32(self.folder_count);
        out.put_u32(self.track_count);
        out.put_u32(self.checksum);
        bytes
    }

    fn compute_checksum(&self) -> u32 {
        let mut signature = &SIGNATURE[..];
        signature.get_u32()
            ^ signature.get_u32()
            ^ self.timestamp
            ^ self.serial_number
            ^ self.reserved
            ^ self.folder_count
            ^ self.track_count
    }
}

/// Parse and check a database header
///
/// Signature first, then the checksum. A file failing either cannot be
/// opened.
pub fn parse_header(data: &[u8]) -> Result<DatabaseHeader> {
    let header = DatabaseHeader::parse(data)?;
    verify_checksum(data)?;
    debug!(
        folders = header.folder_count,
        tracks = header.track_count,
        serial = header.serial_number,
        "Parsed database header"
    );
    Ok(header)
}

/// XOR the first eight words of `data`; the result must be zero
pub fn verify_checksum(data: &[u8]) -> Result<()> {
    if data.len() < HEADER_SIZE {
        return Err(LibraryError::Truncated {
            expected: HEADER_SIZE,
            actual: data.len(),
        });
    }

    let mut buf = &data[..HEADER_SIZE];
    let mut residue = 0u32;
    while buf.has_remaining() {
        residue ^= buf.get_u32();
    }

    if residue != 0 {
        return Err(LibraryError::ChecksumMismatch { residue });
    }
    Ok(())
}

/// Serialize a new header with its checksum
pub fn write_header(
    folder_count: u32,
    track_count: u32,
    timestamp: u32,
    serial_number: u32,
) -> [u8; HEADER_SIZE] {
    DatabaseHeader::new(folder_count, track_count, timestamp, serial_number).to_bytes()
}
