//! # Engine — the partitioned blacklist storage engine
//!
//! [`BlacklistEngine`] owns `P` independent [`PartitionStore`]s, each behind
//! its own lock, and is the aggregate the request handlers in the `server`
//! crate sit on top of. A [`hashkey::HashKey`]'s first byte routes it to
//! exactly one partition for its entire lifetime (`hashkey::partition`); the
//! engine never needs to touch more than one partition to answer a query or
//! serve an ingest.
//!
//! ## Locking
//!
//! Each partition folds its memtable and index-file set behind one
//! `tokio::sync::RwLock`: reads (`contains`, `range`, prefix snapshots) take
//! a read lock, ingests and the flush they may trigger take a write lock.
//! Partitions never block each other, and within a partition, ingests are
//! serialized by the write lock — so two ingests A then B leave exactly the
//! state that running them in that order implies, flush side effects
//! included. A reader that acquires its lock while a flush is in progress
//! either observes the pre-flush or the post-flush state, never a torn one,
//! since the whole write-index-file/truncate-WAL/drain-memtable sequence
//! runs inside [`PartitionStore::ingest`]'s single write-lock section.
//!
//! The engine holds no lock of its own; the activity log's lock (the "log
//! lock" of the concurrency model) lives in the `server` crate and is never
//! held while calling into the engine, so `log ≺ idx ≺ memtable` holds
//! trivially.
mod partition;

pub use partition::PartitionStore;

use config::EngineConfig;
use hashkey::{HashKey, HashPrefix};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors raised by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An underlying I/O error (index file or WAL).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A WAL-layer error.
    #[error("wal error: {0}")]
    Wal(#[from] wal::WalError),
    /// An index-file-layer error.
    #[error("index file error: {0}")]
    IndexFile(#[from] indexfile::IndexFileError),
    /// The key was already present in the blacklist (index files or
    /// memtable). Ingest is rejected; this maps to the `submit-malicious-url`
    /// 400 response.
    #[error("Bad request: URL is already blacklisted")]
    AlreadyPresent,
    /// A partition number outside `[1, P]` (or `[0, P)` internally).
    #[error("partition {0} out of range (have {1} partitions)")]
    PartitionOutOfRange(usize, usize),
}

/// Which tier of a partition to snapshot prefixes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// The in-memory write buffer.
    Memtable,
    /// The on-disk immutable index files.
    Index,
}

/// `[totalCount, partitions]`, as returned by `fetch-blacklist-metadata`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub total_count: usize,
    pub partitions: usize,
}

/// The aggregate of `P` independent, lock-guarded [`PartitionStore`]s.
pub struct BlacklistEngine {
    partitions: Vec<Arc<RwLock<PartitionStore>>>,
    config: EngineConfig,
}

impl BlacklistEngine {
    /// Opens (or creates) every partition's on-disk state under
    /// `config.data_dir`, replaying each WAL and loading each index file
    /// set. Missing directories are created.
    pub async fn open(config: EngineConfig) -> Result<Self, EngineError> {
        let mut partitions = Vec::with_capacity(config.partitions);
        for p in 0..config.partitions {
            let store = PartitionStore::open(
                config.partition_dir(p),
                config.wal_path(p),
                config.keys_per_index_file,
                config.wal_sync,
            )?;
            partitions.push(Arc::new(RwLock::new(store)));
        }
        Ok(Self { partitions, config })
    }

    /// Number of partitions, `P`.
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    fn partition_for(&self, key: &HashKey) -> &Arc<RwLock<PartitionStore>> {
        &self.partitions[hashkey::partition(key, self.partitions.len())]
    }

    fn partition_for_prefix(&self, prefix: &HashPrefix) -> &Arc<RwLock<PartitionStore>> {
        &self.partitions[hashkey::partition_for_prefix(prefix, self.partitions.len())]
    }

    /// One-based partition handle used by the wire-level prefix endpoints
    /// (spec §6, §9: "the source's prefix endpoints use 1-based partition
    /// numbers externally").
    fn partition_by_external_number(
        &self,
        partition: usize,
    ) -> Result<&Arc<RwLock<PartitionStore>>, EngineError> {
        if partition == 0 || partition > self.partitions.len() {
            return Err(EngineError::PartitionOutOfRange(partition, self.partitions.len()));
        }
        Ok(&self.partitions[partition - 1])
    }

    /// `true` if `key` has already been ingested (checked in either tier).
    pub async fn contains(&self, key: &HashKey) -> bool {
        self.partition_for(key).read().await.contains(key)
    }

    /// Ingests `key`, routing it to its partition.
    ///
    /// Preserves the reference source's duplicate check order: index files
    /// are checked before the memtable, and either hit returns the same
    /// [`EngineError::AlreadyPresent`] (spec §9, DESIGN NOTES).
    pub async fn ingest(&self, key: HashKey) -> Result<(), EngineError> {
        let store = self.partition_for(&key);
        let mut guard = store.write().await;
        if guard.contains(&key) {
            return Err(EngineError::AlreadyPresent);
        }
        guard.ingest(key)
    }

    /// Every full 32-byte key whose first 4 bytes equal `prefix`,
    /// concatenated, from the prefix's partition. Empty if none.
    pub async fn full_hashes_for_prefix(&self, prefix: &HashPrefix) -> Vec<u8> {
        let (lo, hi) = prefix.key_bounds();
        let store = self.partition_for_prefix(prefix);
        let guard = store.read().await;
        let keys = guard.range(&lo, &hi);
        let mut out = Vec::with_capacity(keys.len() * hashkey::KEY_LEN);
        for key in keys {
            out.extend_from_slice(key.as_bytes());
        }
        out
    }

    /// Concatenated 4-byte prefixes for `tier` of the given 1-based
    /// `partition`.
    pub async fn prefix_snapshot(
        &self,
        partition: usize,
        tier: Tier,
    ) -> Result<Vec<u8>, EngineError> {
        let store = self.partition_by_external_number(partition)?;
        let guard = store.read().await;
        Ok(match tier {
            Tier::Memtable => guard.memtable_prefix_snapshot(),
            Tier::Index => guard.index_prefix_snapshot(),
        })
    }

    /// `[totalCount, P]`: the sum, across partitions, of each partition's
    /// `approximateCount`.
    pub async fn metadata(&self) -> Metadata {
        let mut total_count = 0;
        for store in &self.partitions {
            total_count += store.read().await.approximate_count();
        }
        Metadata {
            total_count,
            partitions: self.partitions.len(),
        }
    }

    /// The configuration this engine was opened with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests;
