//! Track container codec
//!
//! A stored track is a 32-byte header followed by the ciphered audio:
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 4 | `WMMP` |
//! | 4 | 4 | total size (header + payload) |
//! | 8 | 4 | duration in milliseconds |
//! | 12 | 4 | MPEG frame count |
//! | 16 | 4 | device serial number |
//! | 20 | 1 | flag, always 1 |
//! | 21 | 11 | reserved, zero |
//!
//! All integers are big-endian.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::{debug, warn};

use crate::cipher::CipherTable;
use crate::error::{ContainerError, Result};

/// Tag opening every track container
pub const CONTAINER_TAG: &[u8; 4] = b"WMMP";

/// Size of the container header
pub const CONTAINER_HEADER_SIZE: usize = 32;

const CONTAINER_FLAG: u8 = 1;

/// Decoded container header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub total_size: u32,
    pub duration_ms: u32,
    pub frame_count: u32,
    pub serial_number: u32,
    pub flag: u8,
}

impl ContainerHeader {
    /// Parse the header at the start of `data`
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < CONTAINER_HEADER_SIZE {
            return Err(ContainerError::Truncated {
                expected: CONTAINER_HEADER_SIZE,
                actual: data.len(),
            });
        }

        let mut buf = &data[..CONTAINER_HEADER_SIZE];
        let mut tag = [0u8; 4];
        buf.copy_to_slice(&mut tag);
        if &tag != CONTAINER_TAG {
            return Err(ContainerError::InvalidTag(tag));
        }

        Ok(Self {
            total_size: buf.get_u32(),
            duration_ms: buf.get_u32(),
            frame_count: buf.get_u32(),
            serial_number: buf.get_u32(),
            flag: buf.get_u8(),
        })
    }

    fn write(&self, buf: &mut BytesMut) {
        buf.put_slice(CONTAINER_TAG);
        buf.put_u32(self.total_size);
        buf.put_u32(self.duration_ms);
        buf.put_u32(self.frame_count);
        buf.put_u32(self.serial_number);
        buf.put_u8(self.flag);
        buf.put_bytes(0, CONTAINER_HEADER_SIZE - 21);
    }
}

/// Cipher `audio` for `track_id` and wrap it in a container header
///
/// `audio` must already have its tag block stripped.
///
/// Fails only when the payload does not fit the 32-bit size field.
pub fn encode_container(
    audio: &[u8],
    track_id: u16,
    serial_number: u32,
    duration_ms: u32,
    frame_count: u32,
) -> Result<Bytes> {
    let total_size = u32::try_from(CONTAINER_HEADER_SIZE + audio.len())
        .map_err(|_| ContainerError::PayloadTooLarge(audio.len()))?;

    let header = ContainerHeader {
        total_size,
        duration_ms,
        frame_count,
        serial_number,
        flag: CONTAINER_FLAG,
    };

    let mut buf = BytesMut::with_capacity(total_size as usize);
    header.write(&mut buf);
    buf.extend_from_slice(audio);
    CipherTable::new(track_id, serial_number).apply_in_place(&mut buf[CONTAINER_HEADER_SIZE..]);

    debug!(track_id, total_size, duration_ms, frame_count, "Encoded container");
    Ok(buf.freeze())
}

/// Strip the container header and undo the cipher
///
/// The table is rebuilt from the caller's `serial_number`, which is the
/// serial of the database the track belongs to.
pub fn decode_container(container: &[u8], track_id: u16, serial_number: u32) -> Result<Bytes> {
    let header = ContainerHeader::parse(container)?;

    if header.total_size as usize != container.len() {
        warn!(
            track_id,
            declared = header.total_size,
            actual = container.len(),
            "Container size field disagrees with stored length"
        );
    }
    if header.serial_number != serial_number {
        warn!(
            track_id,
            stored = header.serial_number,
            expected = serial_number,
            "Container was written for a different device"
        );
    }

    let audio = CipherTable::new(track_id, serial_number).apply(&container[CONTAINER_HEADER_SIZE..]);
    debug!(track_id, size = audio.len(), "Decoded container");
    Ok(Bytes::from(audio))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let audio: Vec<u8> = (0..=255u8).cycle().take(3000).collect();
        let container = encode_container(&audio, 5, 0x11223344, 180_000, 6891).unwrap();

        assert_eq!(container.len(), CONTAINER_HEADER_SIZE + audio.len());
        assert_ne!(&container[CONTAINER_HEADER_SIZE..], &audio[..]);

        let decoded = decode_container(&container, 5, 0x11223344).unwrap();
        assert_eq!(&decoded[..], &audio[..]);
    }

    #[test]
    fn test_header_layout() {
        let container = encode_container(&[1, 2, 3], 1, 0xA1B2C3D4, 1234, 56).unwrap();

        assert_eq!(&container[..4], b"WMMP");
        assert_eq!(&container[4..8], &35u32.to_be_bytes());
        assert_eq!(&container[8..12], &1234u32.to_be_bytes());
        assert_eq!(&container[12..16], &56u32.to_be_bytes());
        assert_eq!(&container[16..20], &0xA1B2C3D4u32.to_be_bytes());
        assert_eq!(container[20], 1);
        assert!(container[21..32].iter().all(|&b| b == 0));

        let header = ContainerHeader::parse(&container).unwrap();
        assert_eq!(
            header,
            ContainerHeader {
                total_size: 35,
                duration_ms: 1234,
                frame_count: 56,
                serial_number: 0xA1B2C3D4,
                flag: 1,
            }
        );
    }

    #[test]
    fn test_empty_payload() {
        let container = encode_container(&[], 9, 0, 0, 0).unwrap();
        assert_eq!(container.len(), CONTAINER_HEADER_SIZE);
        assert!(decode_container(&container, 9, 0).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_track_id_does_not_restore() {
        let audio = b"frame data".to_vec();
        let container = encode_container(&audio, 3, 0x10, 0, 0).unwrap();
        let decoded = decode_container(&container, 4, 0x10).unwrap();
        assert_ne!(&decoded[..], &audio[..]);
    }

    #[test]
    fn test_truncated_container() {
        let err = decode_container(&[0u8; 10], 1, 0).unwrap_err();
        assert!(matches!(
            err,
            ContainerError::Truncated {
                expected: 32,
                actual: 10
            }
        ));
    }

    #[test]
    fn test_invalid_tag() {
        let mut container = encode_container(b"abc", 1, 0, 0, 0).unwrap().to_vec();
        container[..4].copy_from_slice(b"RIFF");
        let err = decode_container(&container, 1, 0).unwrap_err();
        assert!(matches!(err, ContainerError::InvalidTag(tag) if &tag == b"RIFF"));
    }
}
