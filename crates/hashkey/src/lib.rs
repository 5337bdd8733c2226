//! # HashKey & PartitionRouter
//!
//! Fixed-width identifiers for the blacklist, and the pure function that
//! routes a key to one of `P` partitions.
//!
//! A [`HashKey`] is the SHA-256 digest of a URL's raw bytes: 32 bytes,
//! compared lexicographically. A [`HashPrefix`] is the first 4 bytes of a
//! key, used by the client's probabilistic filter and by the server's bulk
//! prefix-reporting endpoints.
//!
//! ## Example
//! ```rust
//! use hashkey::{HashKey, partition};
//!
//! let key = HashKey::from_url(b"http://example.test/");
//! let p = partition(&key, 4);
//! assert!(p < 4);
//! ```

use sha2::{Digest, Sha256};
use std::fmt;

/// Number of bytes in a [`HashKey`].
pub const KEY_LEN: usize = 32;
/// Number of bytes in a [`HashPrefix`].
pub const PREFIX_LEN: usize = 4;

/// A 32-byte SHA-256 digest, total-ordered lexicographically over its raw
/// bytes.
///
/// Equality and ordering are bytewise, matching the on-disk sort order used
/// by the memtable and index files.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HashKey([u8; KEY_LEN]);

impl HashKey {
    /// Hashes raw URL bytes into a key via SHA-256.
    pub fn from_url(url_bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(url_bytes);
        let digest = hasher.finalize();
        let mut buf = [0u8; KEY_LEN];
        buf.copy_from_slice(&digest);
        Self(buf)
    }

    /// Wraps an already-computed 32-byte digest.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parses a key from a 32-byte slice.
    ///
    /// Returns `None` if `slice.len() != 32`.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() != KEY_LEN {
            return None;
        }
        let mut buf = [0u8; KEY_LEN];
        buf.copy_from_slice(slice);
        Some(Self(buf))
    }

    /// Parses a key from a lowercase hex string (as used in `url=<hex32>`).
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes).ok_or(hex::FromHexError::InvalidStringLength)
    }

    /// Returns the raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Lowercase hex encoding of the key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns the first 4 bytes as a [`HashPrefix`].
    pub fn prefix(&self) -> HashPrefix {
        let mut buf = [0u8; PREFIX_LEN];
        buf.copy_from_slice(&self.0[..PREFIX_LEN]);
        HashPrefix(buf)
    }
}

impl fmt::Debug for HashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashKey({})", self.to_hex())
    }
}

/// The first 4 bytes of a [`HashKey`].
///
/// Used as a coarse identifier: the client's Bloom filter only ever probes
/// prefixes, never full keys, and the server's `fetch-hashes` and
/// `fetch-prefixes/*` endpoints are keyed by prefix.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HashPrefix([u8; PREFIX_LEN]);

impl HashPrefix {
    /// Wraps an already-extracted 4-byte prefix.
    pub fn from_bytes(bytes: [u8; PREFIX_LEN]) -> Self {
        Self(bytes)
    }

    /// Parses a prefix from a 4-byte slice.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() != PREFIX_LEN {
            return None;
        }
        let mut buf = [0u8; PREFIX_LEN];
        buf.copy_from_slice(slice);
        Some(Self(buf))
    }

    /// Parses a prefix from a lowercase hex string (as used in
    /// `prefix=<hex4>`).
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes).ok_or(hex::FromHexError::InvalidStringLength)
    }

    /// Returns the raw 4 bytes.
    pub fn as_bytes(&self) -> &[u8; PREFIX_LEN] {
        &self.0
    }

    /// Lowercase hex encoding of the prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The inclusive `(lo, hi)` bounds of every [`HashKey`] that carries this
    /// prefix: this prefix followed by all-zero bytes, through this prefix
    /// followed by all-`0xFF` bytes.
    ///
    /// Used to answer prefix queries (`fetch-hashes`) with a single ordered
    /// range scan instead of a dedicated prefix index.
    pub fn key_bounds(&self) -> (HashKey, HashKey) {
        let mut lo = [0u8; KEY_LEN];
        let mut hi = [0xffu8; KEY_LEN];
        lo[..PREFIX_LEN].copy_from_slice(&self.0);
        hi[..PREFIX_LEN].copy_from_slice(&self.0);
        (HashKey(lo), HashKey(hi))
    }
}

impl fmt::Debug for HashPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashPrefix({})", self.to_hex())
    }
}

/// Routes `key` to one of `partitions` partitions using its first byte.
///
/// `partition(key) = (key[0] * P) / 256`. For the default `P = 4` this
/// reduces to `key[0] >> 6`, i.e. the top two bits of the first byte.
///
/// # Panics
///
/// Panics if `partitions == 0`.
pub fn partition(key: &HashKey, partitions: usize) -> usize {
    assert!(partitions > 0, "partitions must be > 0");
    (key.as_bytes()[0] as usize * partitions) / 256
}

/// Routes `prefix` to one of `partitions` partitions, using the same rule
/// as [`partition`] applied to the prefix's first byte.
///
/// Every [`HashKey`] with a given prefix routes to the same partition as
/// the prefix itself, since both route on the key's first byte.
///
/// # Panics
///
/// Panics if `partitions == 0`.
pub fn partition_for_prefix(prefix: &HashPrefix, partitions: usize) -> usize {
    assert!(partitions > 0, "partitions must be > 0");
    (prefix.as_bytes()[0] as usize * partitions) / 256
}
