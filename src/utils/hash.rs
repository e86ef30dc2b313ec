use crc32fast::Hasher;

/// Checksum over a record's magic number and payload.
pub fn calculate_record_checksum(magic: u32, payload: &[u8]) -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&magic.to_le_bytes());
    hasher.update(&(payload.len() as u64).to_le_bytes());
    hasher.update(payload);

    hasher.finalize()
}

pub fn verify_record_checksum(magic: u32, payload: &[u8], expected_checksum: u32) -> bool {
    calculate_record_checksum(magic, payload) == expected_checksum
}
