use engine::EngineError;
use thiserror::Error;

/// Errors surfaced at the request boundary, mapping onto spec.md §7's error
/// kinds: `InputInvalid` and `AlreadyPresent` become 400s, everything else
/// propagates as a transient failure.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Malformed hex, wrong-length prefix/key, or an out-of-range
    /// partition number. Maps to 400.
    #[error("Bad request: {0}")]
    InputInvalid(String),
    /// The submitted URL was already on the blacklist. Maps to 400 with
    /// this exact message (spec.md §6).
    #[error("Bad request: URL is already blacklisted")]
    AlreadyPresent,
    /// An underlying I/O error from the engine or the activity log.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A transient storage-layer failure (WAL or index file). Spec.md §7's
    /// "Transient I/O" kind: the caller leaves state unchanged and should
    /// surface a generic failure rather than a 400.
    #[error("transient storage error: {0}")]
    Transient(String),
}

impl From<EngineError> for ServerError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::AlreadyPresent => ServerError::AlreadyPresent,
            EngineError::PartitionOutOfRange(got, have) => ServerError::InputInvalid(format!(
                "partition {} out of range (have {} partitions)",
                got, have
            )),
            EngineError::Io(e) => ServerError::Io(e),
            EngineError::Wal(e) => ServerError::Transient(e.to_string()),
            EngineError::IndexFile(e) => ServerError::Transient(e.to_string()),
        }
    }
}
