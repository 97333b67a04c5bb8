//! Byte substitution cipher for stored audio payloads
//!
//! The table for a track is built from the track id and the low byte of the
//! device serial number:
//!
//! 1. start from `table[i] = 255 - i`
//! 2. for every bit `b` (1, 2, 4, ... 128) set in the track id, swap the two
//!    halves of each `2 * b` sized block
//! 3. XOR every entry with `(serial & 0xFF) ^ 0xFF`
//!
//! Each step is its own inverse, so the same table both obfuscates and
//! restores a payload. This is obfuscation, not encryption.

use std::fmt;

/// Self-inverse 256-entry substitution table
#[derive(Clone, PartialEq, Eq)]
pub struct CipherTable {
    table: [u8; 256],
}

impl CipherTable {
    /// Build the table for `track_id` on the device with `serial_number`
    pub fn new(track_id: u16, serial_number: u32) -> Self {
        let mut table = [0u8; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            *entry = 255 - i as u8;
        }

        let mut bit = 1usize;
        while bit < table.len() && bit <= usize::from(track_id) {
            if usize::from(track_id) & bit != 0 {
                for block in table.chunks_exact_mut(bit * 2) {
                    let (low, high) = block.split_at_mut(bit);
                    low.swap_with_slice(high);
                }
            }
            bit <<= 1;
        }

        let key = (serial_number & 0xFF) as u8 ^ 0xFF;
        for entry in table.iter_mut() {
            *entry ^= key;
        }

        Self { table }
    }

    /// Substitute a single byte
    pub fn map(&self, byte: u8) -> u8 {
        self.table[usize::from(byte)]
    }

    /// Substitute every byte of `data` into a new buffer of the same length
    pub fn apply(&self, data: &[u8]) -> Vec<u8> {
        data.iter().map(|&b| self.map(b)).collect()
    }

    /// Substitute every byte of `data` in place
    pub fn apply_in_place(&self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            *byte = self.map(*byte);
        }
    }

    pub fn as_bytes(&self) -> &[u8; 256] {
        &self.table
    }
}

impl fmt::Debug for CipherTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherTable")
            .field("head", &&self.table[..8])
            .finish_non_exhaustive()
    }
}
