use bloom::BloomFilter;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

/// Persists `filter` as the opaque blob [`bloom::BloomFilter::write_to`]
/// produces, creating parent directories as needed.
pub fn persist_filter(path: impl AsRef<Path>, filter: &BloomFilter) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut w = BufWriter::new(File::create(path)?);
    filter.write_to(&mut w)
}

/// Loads a filter previously written by [`persist_filter`].
///
/// Returns `Ok(None)` if the file doesn't exist (a fresh client that hasn't
/// rebuilt yet) rather than an error — a missing filter is the expected
/// starting state, not a failure.
pub fn load_filter(path: impl AsRef<Path>) -> io::Result<Option<BloomFilter>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }
    let mut r = BufReader::new(File::open(path)?);
    BloomFilter::read_from(&mut r).map(Some)
}
