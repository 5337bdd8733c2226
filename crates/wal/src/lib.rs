//! # WAL — Write-Ahead Log
//!
//! Per-partition durable mirror of the memtable, between flushes.
//!
//! Every ingested [`HashKey`] is appended to the partition's WAL file
//! **before** it is inserted into the memtable. On restart the WAL is
//! replayed to reconstruct the memtable, so no acknowledged ingest is lost.
//!
//! ## On-disk format
//!
//! The WAL is a bare, append-only sequence of 32-byte records — no header,
//! no length prefix, no checksum:
//!
//! ```text
//! [key: 32 bytes][key: 32 bytes]...
//! ```
//!
//! File size is always a multiple of 32. A size that is *not* a multiple of
//! 32 can only arise from a crash mid-append; the trailing partial record is
//! silently dropped on replay (§7 "Corrupted WAL tail").
//!
//! ## Example
//! ```rust,no_run
//! use hashkey::HashKey;
//! use wal::{WalReader, WalWriter};
//!
//! let mut w = WalWriter::create("partition1.bin", true).unwrap();
//! let key = HashKey::from_url(b"http://a.test/");
//! w.append(&key).unwrap();
//! drop(w);
//!
//! let mut r = WalReader::open("partition1.bin").unwrap();
//! let mut recovered = Vec::new();
//! r.replay(|k| recovered.push(k)).unwrap();
//! ```

use hashkey::{HashKey, KEY_LEN};
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during WAL operations.
#[derive(Debug, Error)]
pub enum WalError {
    /// An underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Append-only WAL writer.
///
/// Each [`append`](WalWriter::append) call writes exactly 32 bytes. When
/// `sync` is `true`, every append is followed by `sync_all()` (fsync) so the
/// record is durable before the call returns; the spec does not mandate a
/// particular fsync discipline, so this is a knob rather than a fixed rule.
pub struct WalWriter {
    file: File,
    sync: bool,
}

impl WalWriter {
    /// Opens (or creates) a WAL file in append mode.
    pub fn create<P: AsRef<Path>>(path: P, sync: bool) -> Result<Self, WalError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)?;
        Ok(Self { file, sync })
    }

    /// Appends `key` as a raw 32-byte record.
    pub fn append(&mut self, key: &HashKey) -> Result<(), WalError> {
        self.file.write_all(key.as_bytes())?;
        self.file.flush()?;
        if self.sync {
            self.file.sync_all()?;
        }
        Ok(())
    }

    /// Forces all buffered data to disk via `sync_all()`.
    pub fn sync_to_disk(&mut self) -> Result<(), WalError> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }

    /// Truncates the WAL to zero bytes, as done after a successful flush.
    ///
    /// Subsequent appends start writing from offset 0 again, since the file
    /// was opened in append mode and append mode always writes at the
    /// current end of file.
    pub fn truncate(&mut self) -> Result<(), WalError> {
        self.file.set_len(0)?;
        if self.sync {
            self.file.sync_all()?;
        }
        Ok(())
    }
}

/// Sequential WAL reader that replays valid 32-byte records.
pub struct WalReader<R: Read> {
    rdr: BufReader<R>,
}

impl WalReader<File> {
    /// Opens an existing WAL file for sequential replay.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<WalReader<File>, WalError> {
        let f = File::open(path.as_ref())?;
        Ok(WalReader {
            rdr: BufReader::new(f),
        })
    }
}

impl<R: Read> WalReader<R> {
    /// Constructs a reader from any `Read` implementor (used in tests with
    /// an in-memory buffer).
    pub fn from_reader(reader: R) -> Self {
        WalReader {
            rdr: BufReader::new(reader),
        }
    }

    /// Replays every complete 32-byte record, calling `apply` for each key
    /// in file order.
    ///
    /// A trailing partial record (fewer than 32 bytes left at EOF) is
    /// treated as a torn write from an interrupted append and silently
    /// dropped — this is the only corruption case a fixed-width, unframed
    /// log can exhibit. If the WAL's byte length is `L`, exactly `L / 32`
    /// records are yielded (§8 property 8).
    pub fn replay<F>(&mut self, mut apply: F) -> Result<(), WalError>
    where
        F: FnMut(HashKey),
    {
        let mut buf = [0u8; KEY_LEN];
        loop {
            match read_exact_or_eof(&mut self.rdr, &mut buf)? {
                ReadOutcome::Full => apply(HashKey::from_bytes(buf)),
                ReadOutcome::Eof | ReadOutcome::TornTail => return Ok(()),
            }
        }
    }
}

enum ReadOutcome {
    Full,
    Eof,
    TornTail,
}

/// Reads exactly `buf.len()` bytes, distinguishing a clean EOF (zero bytes
/// read) from a torn tail (some, but not all, of `buf` filled).
fn read_exact_or_eof<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<ReadOutcome, WalError> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => {
                return Ok(if filled == 0 {
                    ReadOutcome::Eof
                } else {
                    ReadOutcome::TornTail
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(WalError::Io(e)),
        }
    }
    Ok(ReadOutcome::Full)
}
