use crate::{parse_seq, IndexFileError};
use hashkey::{HashKey, KEY_LEN, PREFIX_LEN};
use std::fs;
use std::path::{Path, PathBuf};

/// A single immutable on-disk sorted run, loaded fully into memory.
///
/// Loading the whole file up front (rather than seeking per lookup) mirrors
/// the reference reader: index files are small enough in practice that a
/// single `read` per file beats repeated syscalls for point and range
/// queries.
pub struct IndexFile {
    keys: Vec<HashKey>,
}

impl IndexFile {
    /// Reads `path` into memory.
    ///
    /// Any trailing bytes that don't form a complete 32-byte record are
    /// dropped — this is the only way a file can be "short", and it can
    /// only happen to the most recently written file in a partition after
    /// an interrupted flush.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, IndexFileError> {
        let bytes = fs::read(path)?;
        let whole_records = bytes.len() / KEY_LEN;
        let mut keys = Vec::with_capacity(whole_records);
        for chunk in bytes[..whole_records * KEY_LEN].chunks_exact(KEY_LEN) {
            let mut buf = [0u8; KEY_LEN];
            buf.copy_from_slice(chunk);
            keys.push(HashKey::from_bytes(buf));
        }
        Ok(Self { keys })
    }

    /// Number of complete keys in this file.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True if this file holds zero complete keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Binary search for `key`.
    pub fn contains(&self, key: &HashKey) -> bool {
        self.keys.binary_search(key).is_ok()
    }

    /// Every key `k` with `lo <= k <= hi`, in ascending order.
    ///
    /// Ported from the reference reader's pair of binary searches: the
    /// lower bound is the first key `>= lo`, the upper bound is the first
    /// key `> hi`, so the slice between them is exactly the inclusive range.
    pub fn range(&self, lo: &HashKey, hi: &HashKey) -> &[HashKey] {
        if lo > hi || self.keys.is_empty() {
            return &[];
        }
        let lower = self.keys.partition_point(|k| k < lo);
        let upper = self.keys.partition_point(|k| k <= hi);
        &self.keys[lower..upper]
    }

    /// Appends the 4-byte prefix of every key, in file order, to `out`.
    pub fn append_prefixes(&self, out: &mut Vec<u8>) {
        for key in &self.keys {
            out.extend_from_slice(key.prefix().as_bytes());
        }
    }
}

/// The ordered sequence of index files belonging to one partition.
pub struct IndexFileSet {
    dir: PathBuf,
    files: Vec<(u32, IndexFile)>,
}

impl IndexFileSet {
    /// Scans `dir` for `idx_NNN.bin` files and loads them all, in ascending
    /// sequence order. A missing directory is treated as empty.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, IndexFileError> {
        let dir = dir.as_ref().to_path_buf();
        let mut entries: Vec<(u32, PathBuf)> = Vec::new();

        if dir.is_dir() {
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                let name = entry.file_name();
                let name = name.to_string_lossy();
                if let Some(seq) = parse_seq(&name) {
                    entries.push((seq, entry.path()));
                }
            }
        }
        entries.sort_by_key(|(seq, _)| *seq);

        let mut files = Vec::with_capacity(entries.len());
        for (seq, path) in entries {
            files.push((seq, IndexFile::open(path)?));
        }

        Ok(Self { dir, files })
    }

    /// Registers a freshly flushed file without rescanning the directory.
    pub fn push(&mut self, seq: u32, path: &Path) -> Result<(), IndexFileError> {
        let file = IndexFile::open(path)?;
        self.files.push((seq, file));
        Ok(())
    }

    /// The sequence number the next flush should use: one past the largest
    /// existing sequence number, or 1 if this partition has no files yet.
    pub fn next_seq(&self) -> u32 {
        self.files.iter().map(|(seq, _)| *seq).max().unwrap_or(0) + 1
    }

    /// The directory this set was opened from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// True if `key` appears in any file.
    pub fn contains(&self, key: &HashKey) -> bool {
        self.files.iter().any(|(_, f)| f.contains(key))
    }

    /// Concatenation, across files in file order, of each file's matching
    /// slice for `lo ..= hi`.
    pub fn range(&self, lo: &HashKey, hi: &HashKey) -> Vec<HashKey> {
        let mut out = Vec::new();
        for (_, f) in &self.files {
            out.extend_from_slice(f.range(lo, hi));
        }
        out
    }

    /// Concatenated 4-byte prefix of every key across all files, in file
    /// order then key order.
    pub fn prefix_snapshot(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.files.len() * PREFIX_LEN);
        for (_, f) in &self.files {
            f.append_prefixes(&mut out);
        }
        out
    }

    /// Number of index files in this partition.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Total number of keys across all files.
    pub fn total_keys(&self) -> usize {
        self.files.iter().map(|(_, f)| f.len()).sum()
    }
}
