mod partition_tests;

use hashkey::HashKey;

/// Builds a 32-byte key with the given first byte and the rest filled with
/// `tail`, mirroring the helper convention used by `memtable`/`indexfile`.
pub(crate) fn key(byte0: u8, tail: u8) -> HashKey {
    let mut bytes = [tail; 32];
    bytes[0] = byte0;
    HashKey::from_bytes(bytes)
}

/// A distinct key derived from `n`, spread across all 256 first-byte values
/// so tests can generate many non-colliding keys.
pub(crate) fn key_n(n: u32) -> HashKey {
    let mut bytes = [0u8; 32];
    bytes[0] = (n % 256) as u8;
    bytes[1..5].copy_from_slice(&n.to_be_bytes());
    HashKey::from_bytes(bytes)
}
