//! # Client — URL safety lookup client
//!
//! Implements the three end-to-end flows of spec.md §4.6 against an
//! abstract [`Transport`]: check a URL, submit a malicious URL, and rebuild
//! the local probabilistic filter from a server snapshot. This crate never
//! touches a network socket itself — the transport is injected, exactly the
//! boundary the teacher's `cli` crate draws around its own engine (only
//! here the "engine" lives on the far side of the wire).
//!
//! Unlike the server, the client has no cooperative-scheduler requirement
//! in the spec — the reference source (`client.py`) drives these flows
//! synchronously one request at a time, and so does this crate.
mod filter_store;
mod transport;

pub use filter_store::{load_filter, persist_filter};
pub use transport::{Metadata, SubmitError, Transport, TransportError};

use bloom::BloomFilter;
use config::ClientConfig;
use hashkey::HashKey;

/// The outcome of [`Client::check_url`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckResult {
    /// The URL's hash did not appear on the server's blacklist (or the local
    /// filter ruled it out without a round trip).
    Safe,
    /// The URL's full hash was found in the server's `fetch-hashes`
    /// response for its prefix.
    Malicious,
}

/// A client session: an identifier used for log attribution, a transport,
/// and the locally persisted probabilistic filter.
pub struct Client<T: Transport> {
    transport: T,
    client_id: String,
    config: ClientConfig,
    filter: Option<BloomFilter>,
}

impl<T: Transport> Client<T> {
    /// Opens a client session, loading the persisted filter from
    /// `config.filter_path` if one exists. A missing or unreadable filter
    /// leaves `filter` absent — callers should check [`Client::has_filter`]
    /// and call [`Client::rebuild_filter`] if it's `false`.
    pub fn new(transport: T, client_id: impl Into<String>, config: ClientConfig) -> Self {
        let filter = load_filter(&config.filter_path).ok().flatten();
        Self {
            transport,
            client_id: client_id.into(),
            config,
            filter,
        }
    }

    /// `true` if a local filter is currently loaded.
    pub fn has_filter(&self) -> bool {
        self.filter.is_some()
    }

    /// Checks whether `url` appears on the server's blacklist.
    ///
    /// 1. Hash the URL; take its 4-byte prefix.
    /// 2. If a local filter exists and rules the prefix out, report
    ///    [`CheckResult::Safe`] without a round trip.
    /// 3. Otherwise fetch every full key sharing that prefix from the
    ///    server and look for a bytewise, 32-byte-aligned match.
    pub fn check_url(&self, url: &str) -> Result<CheckResult, TransportError> {
        let key = HashKey::from_url(url.as_bytes());
        let prefix = key.prefix();

        if let Some(filter) = &self.filter {
            if !filter.maybe_contains(prefix.as_bytes()) {
                return Ok(CheckResult::Safe);
            }
        }

        let hashes = self
            .transport
            .fetch_hashes(&self.client_id, prefix)?;

        let found = hashes
            .chunks_exact(hashkey::KEY_LEN)
            .any(|chunk| chunk == key.as_bytes());

        Ok(if found {
            CheckResult::Malicious
        } else {
            CheckResult::Safe
        })
    }

    /// Submits `url` to be blacklisted.
    ///
    /// On success, the URL's prefix is added to the local filter and the
    /// filter is persisted. On *any* failure — including the server
    /// rejecting the URL as already blacklisted — the local filter is
    /// dropped, forcing a rebuild before the next check (mirrors the
    /// reference source's `blacklist_url`, spec §7 "the client ... marks
    /// its local filter as stale").
    pub fn submit_url(&mut self, url: &str) -> Result<(), SubmitError> {
        let key = HashKey::from_url(url.as_bytes());

        match self.transport.submit_malicious_url(&self.client_id, key) {
            Ok(()) => {
                if let Some(filter) = &mut self.filter {
                    filter.add(key.prefix().as_bytes());
                    let _ = persist_filter(&self.config.filter_path, filter);
                }
                Ok(())
            }
            Err(e) => {
                self.filter = None;
                Err(e)
            }
        }
    }

    /// Rebuilds the local filter from a full server snapshot (spec §4.6
    /// "Rebuild the filter"):
    ///
    /// 1. `fetch-blacklist-metadata` for `[totalCount, partitions]`.
    /// 2. Size a filter for `totalCount` at the configured target rate.
    /// 3. For each partition `1..=partitions`, fetch and insert the
    ///    memtable tier's prefixes, then the index tier's.
    /// 4. Persist the filter.
    pub fn rebuild_filter(&mut self) -> Result<(), TransportError> {
        let Metadata {
            total_count,
            partitions,
        } = self.transport.fetch_blacklist_metadata(&self.client_id)?;

        let mut filter = BloomFilter::new(
            total_count.max(1),
            self.config.target_false_positive_rate,
        );

        for partition in 1..=partitions {
            for prefixes in [
                self.transport
                    .fetch_prefixes_memtable(&self.client_id, partition)?,
                self.transport
                    .fetch_prefixes_index(&self.client_id, partition)?,
            ] {
                for chunk in prefixes.chunks_exact(hashkey::PREFIX_LEN) {
                    filter.add(chunk);
                }
            }
        }

        let _ = persist_filter(&self.config.filter_path, &filter);
        self.filter = Some(filter);
        Ok(())
    }
}
