//! # Memtable
//!
//! An ordered, duplicate-free, in-memory write buffer for a single
//! partition of the blacklist.
//!
//! Every ingested [`HashKey`] lands here first, before it is ever visible in
//! an on-disk index file. The memtable is the freshest tier the engine
//! checks on every lookup, and the source of the next flushed index file
//! once it reaches `N` entries.
//!
//! ## Key properties
//! - **Sorted order**: ascending iteration is required for index-file flush
//!   (keys must be written strictly increasing).
//! - **Duplicate-free**: re-inserting an existing key is a no-op and is
//!   reported as such to the caller.
//! - **Inclusive range scan**: `lo <= k <= hi`, ascending.
//!
//! ## Example
//! ```rust
//! use hashkey::HashKey;
//! use memtable::Memtable;
//!
//! let mut m = Memtable::new();
//! let key = HashKey::from_url(b"http://a.test/");
//! assert!(m.insert(key));
//! assert!(!m.insert(key));
//! assert!(m.contains(&key));
//! assert_eq!(m.len(), 1);
//! ```

use hashkey::HashKey;
use std::collections::BTreeSet;

/// An ordered, in-memory set of [`HashKey`]s backed by a `BTreeSet`.
///
/// A `BTreeSet` is a library-quality balanced ordered set keyed by a
/// fixed-size byte string, one of the structures the design explicitly
/// allows in place of a hand-rolled red-black tree: the engine never
/// observes internal pointers, only the insert/contains/range/iter
/// contract.
#[derive(Debug, Default)]
pub struct Memtable {
    set: BTreeSet<HashKey>,
}

impl Memtable {
    /// Creates a new, empty memtable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `key`, returning `true` if it was newly added and `false` if
    /// it was already present. The set contains `key` after this call
    /// either way.
    pub fn insert(&mut self, key: HashKey) -> bool {
        self.set.insert(key)
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: &HashKey) -> bool {
        self.set.contains(key)
    }

    /// Returns every key `k` with `lo <= k <= hi`, in ascending order.
    ///
    /// If `lo > hi` the result is empty. Bounds are inclusive on both ends.
    pub fn range(&self, lo: &HashKey, hi: &HashKey) -> Vec<HashKey> {
        if lo > hi {
            return Vec::new();
        }
        self.set.range(*lo..=*hi).copied().collect()
    }

    /// Returns an iterator over all keys in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &HashKey> {
        self.set.iter()
    }

    /// Returns the first `n` keys in ascending order, for flushing.
    ///
    /// Panics if `n > self.len()` — callers must check [`Memtable::len`]
    /// first (the flush precondition is `len() >= n`).
    pub fn take_first(&self, n: usize) -> Vec<HashKey> {
        assert!(n <= self.set.len(), "take_first: n exceeds memtable size");
        self.set.iter().take(n).copied().collect()
    }

    /// Removes every key in `keys` from the memtable.
    ///
    /// Used by the engine after a successful flush, to drain the keys that
    /// were just written to a new index file.
    pub fn remove_all(&mut self, keys: &[HashKey]) {
        for key in keys {
            self.set.remove(key);
        }
    }

    /// Returns the number of keys in the memtable.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Returns `true` if the memtable contains zero keys.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Removes all keys.
    pub fn clear(&mut self) {
        self.set.clear();
    }
}
