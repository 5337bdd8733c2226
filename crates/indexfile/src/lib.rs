//! # IndexFile — immutable on-disk sorted run
//!
//! Once a partition's memtable reaches its flush threshold, its first `N`
//! keys are written out as a new, immutable index file. Index files are
//! *write-once, read-many* — never modified, never deleted, never merged.
//!
//! ## File layout
//!
//! ```text
//! [key: 32 bytes][key: 32 bytes]...  (exactly N records, strictly increasing)
//! ```
//!
//! No header, no footer, no checksum — unlike the teacher's SSTable format,
//! an index file carries nothing but packed keys. A file of fewer than `N`
//! complete keys can only exist as the last file of a partition after a
//! flush was interrupted mid-write; any trailing bytes that don't form a
//! complete 32-byte record are treated as absent.
//!
//! Filenames are `idx_{seq:03}.bin`, with `seq` a monotonically increasing
//! per-partition integer starting at 1.

mod reader;
mod writer;

pub use reader::{IndexFile, IndexFileSet};
pub use writer::flush;

use thiserror::Error;

/// Number of keys packed into a full index file.
pub const DEFAULT_KEYS_PER_FILE: usize = 15_625;

/// Errors that can occur during index file operations.
#[derive(Debug, Error)]
pub enum IndexFileError {
    /// An underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The filename did not match the `idx_{seq:03}.bin` convention.
    #[error("malformed index file name: {0}")]
    MalformedName(String),
}

/// Formats the on-disk filename for sequence number `seq`.
pub fn file_name(seq: u32) -> String {
    format!("idx_{:03}.bin", seq)
}

/// Parses a sequence number back out of a filename produced by [`file_name`].
///
/// Returns `None` if the name doesn't match the `idx_NNN.bin` convention
/// (used to skip unrelated files when scanning a partition directory).
pub fn parse_seq(name: &str) -> Option<u32> {
    let stem = name.strip_prefix("idx_")?.strip_suffix(".bin")?;
    stem.parse().ok()
}
