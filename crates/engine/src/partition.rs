//! # PartitionStore
//!
//! One partition's worth of state: a memtable, its WAL, and the ordered
//! list of index files flushed from it so far. `BlacklistEngine` holds `P`
//! of these behind a lock each; this type itself does no locking.

use crate::EngineError;
use hashkey::HashKey;
use indexfile::IndexFileSet;
use memtable::Memtable;
use std::path::{Path, PathBuf};
use wal::{WalReader, WalWriter};

pub struct PartitionStore {
    memtable: Memtable,
    index_files: IndexFileSet,
    wal: WalWriter,
    wal_path: PathBuf,
    keys_per_index_file: usize,
}

impl PartitionStore {
    /// Opens a partition's on-disk state, replaying its WAL into a fresh
    /// memtable and loading its existing index files.
    ///
    /// Both directories are created if missing.
    pub fn open(
        index_dir: impl AsRef<Path>,
        wal_path: impl AsRef<Path>,
        keys_per_index_file: usize,
        wal_sync: bool,
    ) -> Result<Self, EngineError> {
        let wal_path = wal_path.as_ref().to_path_buf();
        if let Some(parent) = wal_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut memtable = Memtable::new();
        if wal_path.exists() {
            let mut reader = WalReader::open(&wal_path)?;
            reader.replay(|key| {
                memtable.insert(key);
            })?;
        }

        let index_files = IndexFileSet::open(index_dir)?;
        let wal = WalWriter::create(&wal_path, wal_sync)?;

        Ok(Self {
            memtable,
            index_files,
            wal,
            wal_path,
            keys_per_index_file,
        })
    }

    /// `true` if `key` is in the memtable or in any index file.
    pub fn contains(&self, key: &HashKey) -> bool {
        self.memtable.contains(key) || self.index_files.contains(key)
    }

    /// Appends `key` to the WAL, inserts it into the memtable, and flushes
    /// if the memtable has reached its threshold.
    ///
    /// Callers must have already checked [`PartitionStore::contains`] — this
    /// method does not re-check, so that the caller can hold a single write
    /// lock across the check-then-ingest sequence.
    pub fn ingest(&mut self, key: HashKey) -> Result<(), EngineError> {
        self.wal.append(&key)?;
        self.memtable.insert(key);

        if self.memtable.len() >= self.keys_per_index_file {
            self.flush()?;
        }
        Ok(())
    }

    /// Writes the memtable's first `keys_per_index_file` keys to a new index
    /// file, then truncates the WAL, then drains those keys from the
    /// memtable — in that exact order, so a crash at any point leaves the
    /// new index file durable before the WAL or memtable are touched.
    fn flush(&mut self) -> Result<(), EngineError> {
        let keys = self.memtable.take_first(self.keys_per_index_file);
        let seq = self.index_files.next_seq();
        let path = indexfile::flush(self.index_files.dir(), seq, &keys)?;

        self.wal.truncate()?;
        self.memtable.remove_all(&keys);

        self.index_files.push(seq, &path)?;
        Ok(())
    }

    /// Concatenation of the memtable's and the index files' matching keys
    /// for `lo ..= hi`. The relative order of the two tiers is unspecified.
    pub fn range(&self, lo: &HashKey, hi: &HashKey) -> Vec<HashKey> {
        let mut out = self.memtable.range(lo, hi);
        out.extend(self.index_files.range(lo, hi));
        out
    }

    /// Concatenated 4-byte prefixes of every memtable key, in ascending
    /// order.
    pub fn memtable_prefix_snapshot(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.memtable.len() * hashkey::PREFIX_LEN);
        for key in self.memtable.iter() {
            out.extend_from_slice(key.prefix().as_bytes());
        }
        out
    }

    /// Concatenated 4-byte prefixes across all index files, in file order
    /// then key order.
    pub fn index_prefix_snapshot(&self) -> Vec<u8> {
        self.index_files.prefix_snapshot()
    }

    /// `fileCount * N + memtableLen`: the client's sizing estimate for this
    /// partition's population. Over-approximates the real count by at most
    /// `N - 1` when the newest index file is exactly full.
    pub fn approximate_count(&self) -> usize {
        self.index_files.file_count() * self.keys_per_index_file + self.memtable.len()
    }

    /// Number of index files flushed so far.
    pub fn file_count(&self) -> usize {
        self.index_files.file_count()
    }

    #[cfg(test)]
    pub(crate) fn wal_path(&self) -> &Path {
        &self.wal_path
    }

    #[cfg(test)]
    pub(crate) fn memtable_len(&self) -> usize {
        self.memtable.len()
    }
}
