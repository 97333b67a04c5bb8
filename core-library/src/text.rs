//! Fixed-width UTF-16BE text slots

/// Folder name slot in the folder table
pub const FOLDER_NAME_SLOT: usize = 252;

/// File name, title and artist slots in the metadata table
pub const TEXT_SLOT: usize = 256;

/// Decode a slot up to its first zero code unit
pub fn read_text(slot: &[u8]) -> String {
    let units: Vec<u16> = slot
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0)
        .collect();

    String::from_utf16_lossy(&units).trim().to_string()
}

/// Encode `text` into a zero-initialised slot
///
/// Text that does not fit is cut at a character boundary so at least one
/// zero code unit remains as terminator. Returns the number of code units
/// written.
pub fn write_text(slot: &mut [u8], text: &str) -> usize {
    let capacity = (slot.len() / 2).saturating_sub(1);
    let mut written = 0;
    let mut units = [0u16; 2];

    for ch in text.chars() {
        let encoded = ch.encode_utf16(&mut units);
        if written + encoded.len() > capacity {
            break;
        }
        for unit in encoded.iter() {
            let at = written * 2;
            slot[at..at + 2].copy_from_slice(&unit.to_be_bytes());
            written += 1;
        }
    }

    written
}
