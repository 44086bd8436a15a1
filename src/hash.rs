use crc::{Crc, CRC_32_ISO_HDLC};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Maps a byte sequence to a position on the 32-bit ring.
pub type Hasher = Arc<dyn Fn(&[u8]) -> u32 + Send + Sync>;

const IEEE: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// CRC-32 with the IEEE polynomial. The default ring hash.
pub fn crc32_ieee(input: &[u8]) -> u32 {
    IEEE.checksum(input)
}

/// SHA-256 truncated to its first four bytes, big-endian.
pub fn generate_hash32(input: &[u8]) -> u32 {
    let mut hasher = Sha256::new();
    hasher.update(input);
    let hash = hasher.finalize();

    u32::from_be_bytes([hash[0], hash[1], hash[2], hash[3]])
}

pub fn default_hasher() -> Hasher {
    Arc::new(crc32_ieee)
}

#[test]
fn test_crc32_check_value() {
    assert_eq!(crc32_ieee(b"123456789"), 0xCBF4_3926);
    assert_eq!(crc32_ieee(b""), 0);
}

#[test]
fn test_generate_hash32() {
    let key = "key".to_owned();
    let hash = generate_hash32(key.as_bytes());
    let hash_retry = generate_hash32(key.as_bytes());

    assert_eq!(hash, hash_retry);
    assert_ne!(hash, generate_hash32(b"other key"));
}

#[test]
fn test_default_hasher_is_crc32() {
    let hasher = default_hasher();
    assert_eq!(hasher(b"0NodeA"), crc32_ieee(b"0NodeA"));
}
