use crate::{file_name, IndexFileError};
use hashkey::HashKey;
use std::fs::{rename, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes `keys` to a new index file `idx_{seq:03}.bin` inside `dir`.
///
/// `keys` must already be sorted in ascending order; the caller (the
/// partition store) is responsible for that — this function only packs and
/// persists them.
///
/// The write is crash-safe: data lands in a temporary file first, is
/// fsynced, then atomically renamed into place. The caller must not clear
/// the memtable or truncate the WAL until this function returns `Ok`.
pub fn flush<P: AsRef<Path>>(dir: P, seq: u32, keys: &[HashKey]) -> Result<PathBuf, IndexFileError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let final_path = dir.join(file_name(seq));
    let tmp_path = dir.join(format!("{}.tmp", file_name(seq)));

    {
        let raw = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;
        let mut w = BufWriter::new(raw);
        for key in keys {
            w.write_all(key.as_bytes())?;
        }
        w.flush()?;
        w.into_inner()
            .map_err(|e| IndexFileError::Io(e.into_error()))?
            .sync_all()?;
    }

    rename(&tmp_path, &final_path)?;

    if let Some(parent) = final_path.parent() {
        if let Ok(dir_handle) = File::open(parent) {
            let _ = dir_handle.sync_all();
        }
    }

    Ok(final_path)
}
