use hashkey::{HashKey, HashPrefix};
use thiserror::Error;

/// `[totalCount, partitions]`, the payload of `fetch-blacklist-metadata`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub total_count: usize,
    pub partitions: usize,
}

/// An error from any request except `submit-malicious-url`, which has its
/// own error type distinguishing the "already blacklisted" case.
#[derive(Debug, Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

/// The outcome of a failed `submit-malicious-url` request.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The server responded 400 "Bad request: URL is already blacklisted".
    #[error("Bad request: URL is already blacklisted")]
    AlreadyBlacklisted,
    /// Any other transport-level failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// The five server endpoints of spec.md §6, as a pluggable abstraction over
/// whatever HTTP (or in-process) client actually carries the bytes. This
/// crate never picks that client — wiring a [`Transport`] to a concrete
/// HTTP library is the deliberately excluded transport layer (spec.md §1).
pub trait Transport {
    /// `GET /fetch-hashes?client=..&prefix=..`: every full key sharing
    /// `prefix`, concatenated.
    fn fetch_hashes(&self, client_id: &str, prefix: HashPrefix) -> Result<Vec<u8>, TransportError>;

    /// `POST /submit-malicious-url?client=..&url=..`.
    fn submit_malicious_url(&self, client_id: &str, key: HashKey) -> Result<(), SubmitError>;

    /// `GET /fetch-prefixes/memtable?client=..&partition=..` (1-based).
    fn fetch_prefixes_memtable(
        &self,
        client_id: &str,
        partition: usize,
    ) -> Result<Vec<u8>, TransportError>;

    /// `GET /fetch-prefixes/index?client=..&partition=..` (1-based).
    fn fetch_prefixes_index(
        &self,
        client_id: &str,
        partition: usize,
    ) -> Result<Vec<u8>, TransportError>;

    /// `GET /fetch-blacklist-metadata?client=..`.
    fn fetch_blacklist_metadata(&self, client_id: &str) -> Result<Metadata, TransportError>;
}
