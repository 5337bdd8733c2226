use super::{key, key_n};
use crate::PartitionStore;
use tempfile::tempdir;

fn open(dir: &std::path::Path, n: usize) -> PartitionStore {
    PartitionStore::open(dir.join("idx"), dir.join("wal.bin"), n, false).unwrap()
}

#[test]
fn ingest_then_contains() {
    let dir = tempdir().unwrap();
    let mut store = open(dir.path(), 100);
    let k = key(1, 2);
    assert!(!store.contains(&k));
    store.ingest(k).unwrap();
    assert!(store.contains(&k));
}

#[test]
fn wal_mirrors_memtable_between_flushes() {
    let dir = tempdir().unwrap();
    let mut store = open(dir.path(), 100);
    for i in 0..10 {
        store.ingest(key_n(i)).unwrap();
    }
    let wal_len = std::fs::metadata(store.wal_path()).unwrap().len();
    assert_eq!(wal_len, 10 * 32);
    assert_eq!(store.memtable_len(), 10);
}

#[test]
fn flush_writes_index_file_truncates_wal_drains_memtable() {
    let dir = tempdir().unwrap();
    let n = 5;
    let mut store = open(dir.path(), n);
    for i in 0..n as u32 {
        store.ingest(key_n(i)).unwrap();
    }
    // The n-th ingest crossed the threshold: flush must have run.
    assert_eq!(store.file_count(), 1);
    assert_eq!(store.memtable_len(), 0);
    let wal_len = std::fs::metadata(store.wal_path()).unwrap().len();
    assert_eq!(wal_len, 0);

    let idx_path = dir.path().join("idx").join("idx_001.bin");
    let meta = std::fs::metadata(&idx_path).unwrap();
    assert_eq!(meta.len(), (n * 32) as u64);
}

#[test]
fn flush_leaves_remainder_in_memtable() {
    let dir = tempdir().unwrap();
    let n = 5;
    let mut store = open(dir.path(), n);
    for i in 0..(n as u32 + 1) {
        store.ingest(key_n(i)).unwrap();
    }
    assert_eq!(store.file_count(), 1);
    assert_eq!(store.memtable_len(), 1);
}

#[test]
fn recovery_replays_wal_into_fresh_memtable() {
    let dir = tempdir().unwrap();
    {
        let mut store = open(dir.path(), 1000);
        for i in 0..7 {
            store.ingest(key_n(i)).unwrap();
        }
    }
    let store = open(dir.path(), 1000);
    assert_eq!(store.memtable_len(), 7);
    for i in 0..7 {
        assert!(store.contains(&key_n(i)));
    }
}

#[test]
fn recovery_drops_torn_wal_tail() {
    let dir = tempdir().unwrap();
    let wal_path = dir.path().join("wal.bin");
    std::fs::create_dir_all(dir.path().join("idx")).unwrap();
    // Two full 32-byte records plus 10 stray bytes from a torn write.
    let mut bytes = Vec::new();
    bytes.extend_from_slice(key_n(0).as_bytes());
    bytes.extend_from_slice(key_n(1).as_bytes());
    bytes.extend_from_slice(&[0xffu8; 10]);
    std::fs::write(&wal_path, &bytes).unwrap();

    let store = open(dir.path(), 1000);
    assert_eq!(store.memtable_len(), 2);
}

#[test]
fn simulated_crash_after_index_write_before_wal_truncate() {
    // Manually reproduce spec §8 scenario 5: write the index file but leave
    // the WAL populated, as if the process died between the two steps.
    let dir = tempdir().unwrap();
    let n = 4;
    let keys: Vec<_> = (0..n as u32).map(key_n).collect();

    let idx_dir = dir.path().join("idx");
    indexfile::flush(&idx_dir, 1, &keys).unwrap();

    let wal_path = dir.path().join("wal.bin");
    let mut wal_bytes = Vec::new();
    for k in &keys {
        wal_bytes.extend_from_slice(k.as_bytes());
    }
    std::fs::write(&wal_path, &wal_bytes).unwrap();

    let store = open(dir.path(), n);
    // Duplicated across tiers, but visible in both, exactly as spec'd.
    assert_eq!(store.memtable_len(), n);
    assert_eq!(store.file_count(), 1);
    for k in &keys {
        assert!(store.contains(k));
    }
}

#[test]
fn range_spans_memtable_and_index_files() {
    let dir = tempdir().unwrap();
    let n = 4;
    let mut store = open(dir.path(), n);
    // First four keys flush to idx_001.bin, the fifth stays in the memtable.
    for i in 0..5u32 {
        store.ingest(key_n(i)).unwrap();
    }
    let lo = key_n(0);
    let hi = key_n(4);
    let mut got = store.range(&lo, &hi);
    got.sort();
    let mut want: Vec<_> = (0..5u32).map(key_n).collect();
    want.sort();
    assert_eq!(got, want);
}

#[test]
fn prefix_snapshots_split_by_tier() {
    let dir = tempdir().unwrap();
    let n = 3;
    let mut store = open(dir.path(), n);
    for i in 0..4u32 {
        store.ingest(key_n(i)).unwrap();
    }
    // idx 0,1,2 flushed; 3 remains in the memtable.
    assert_eq!(store.index_prefix_snapshot().len(), 3 * hashkey::PREFIX_LEN);
    assert_eq!(store.memtable_prefix_snapshot().len(), 1 * hashkey::PREFIX_LEN);
}

#[test]
fn approximate_count_over_approximates_by_at_most_n_minus_one() {
    let dir = tempdir().unwrap();
    let n = 6;
    let mut store = open(dir.path(), n);
    for i in 0..(n as u32) {
        store.ingest(key_n(i)).unwrap();
    }
    // Exactly full: file_count=1, memtable=0 -> approximate_count == real count.
    assert_eq!(store.approximate_count(), n);
}
