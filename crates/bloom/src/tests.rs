use super::*;
use std::io::Cursor;

// -------------------- Construction --------------------

#[test]
fn new_creates_valid_filter() {
    let bf = BloomFilter::new(100, 0.01);
    assert!(bf.num_bits() > 0);
    assert!(bf.num_hashes() > 0);
    assert!(!bf.bits.is_empty());
}

#[test]
#[should_panic(expected = "expected_items must be > 0")]
fn new_panics_on_zero_items() {
    BloomFilter::new(0, 0.01);
}

#[test]
#[should_panic(expected = "false_positive_rate must be in (0, 1)")]
fn new_panics_on_zero_fpr() {
    BloomFilter::new(100, 0.0);
}

#[test]
#[should_panic(expected = "false_positive_rate must be in (0, 1)")]
fn new_panics_on_one_fpr() {
    BloomFilter::new(100, 1.0);
}

// -------------------- Add / maybe_contains --------------------

#[test]
fn added_key_is_found() {
    let mut bf = BloomFilter::new(100, 0.01);
    bf.add(b"hello");
    assert!(bf.maybe_contains(b"hello"));
}

#[test]
fn missing_key_is_not_found() {
    let bf = BloomFilter::new(100, 0.01);
    assert!(!bf.maybe_contains(b"hello"));
}

#[test]
fn many_keys_all_found() {
    let mut bf = BloomFilter::new(1000, 0.01);
    for i in 0..1000u64 {
        bf.add(&i.to_le_bytes());
    }
    for i in 0..1000u64 {
        assert!(
            bf.maybe_contains(&i.to_le_bytes()),
            "key {} should be found",
            i
        );
    }
}

#[test]
fn false_positive_rate_is_reasonable() {
    let n = 10_000;
    let fpr = 0.01;
    let mut bf = BloomFilter::new(n, fpr);

    for i in 0..n as u64 {
        bf.add(&i.to_le_bytes());
    }

    let mut false_positives = 0;
    let test_count = 10_000;
    for i in (n as u64)..(n as u64 + test_count) {
        if bf.maybe_contains(&i.to_le_bytes()) {
            false_positives += 1;
        }
    }

    let actual_fpr = false_positives as f64 / test_count as f64;
    // Allow up to 3x the target FPR (statistical variance)
    assert!(
        actual_fpr < fpr * 3.0,
        "FPR too high: {:.4} (target {:.4})",
        actual_fpr,
        fpr
    );
}

#[test]
fn empty_key() {
    let mut bf = BloomFilter::new(10, 0.01);
    bf.add(b"");
    assert!(bf.maybe_contains(b""));
}

#[test]
fn binary_key() {
    let mut bf = BloomFilter::new(10, 0.01);
    let key = vec![0u8, 1, 2, 255, 254, 253];
    bf.add(&key);
    assert!(bf.maybe_contains(&key));
}

#[test]
fn four_byte_prefix_keys() {
    // The filter always probes with 4-byte hash prefixes in practice.
    let mut bf = BloomFilter::new(50, 0.01);
    let prefixes: Vec<[u8; 4]> = (0u32..50).map(|i| i.to_be_bytes()).collect();
    for p in &prefixes {
        bf.add(p);
    }
    for p in &prefixes {
        assert!(bf.maybe_contains(p));
    }
}

// -------------------- Murmur3 --------------------

#[test]
fn murmur3_is_deterministic() {
    assert_eq!(
        murmur3_x86_32(b"abcd", 0),
        murmur3_x86_32(b"abcd", 0)
    );
}

#[test]
fn murmur3_varies_with_seed() {
    assert_ne!(murmur3_x86_32(b"abcd", 0), murmur3_x86_32(b"abcd", 1));
}

#[test]
fn murmur3_handles_all_tail_lengths() {
    for len in 0..8 {
        let data: Vec<u8> = (0..len as u8).collect();
        // Must not panic for any tail length 0..=3 mod 4.
        let _ = murmur3_x86_32(&data, 7);
    }
}

// -------------------- Serialization --------------------

#[test]
fn roundtrip_serialize_deserialize() {
    let mut bf = BloomFilter::new(500, 0.01);
    for i in 0..500u64 {
        bf.add(&i.to_le_bytes());
    }

    let mut buf = Vec::new();
    bf.write_to(&mut buf).unwrap();
    assert_eq!(buf.len(), bf.serialized_size());

    let mut cursor = Cursor::new(&buf);
    let bf2 = BloomFilter::read_from(&mut cursor).unwrap();

    assert_eq!(bf2.num_bits(), bf.num_bits());
    assert_eq!(bf2.num_hashes(), bf.num_hashes());
    assert_eq!(bf2.bits, bf.bits);

    for i in 0..500u64 {
        assert!(
            bf2.maybe_contains(&i.to_le_bytes()),
            "key {} missing after roundtrip",
            i
        );
    }
}

#[test]
fn serialized_size_is_correct() {
    let bf = BloomFilter::new(100, 0.05);
    assert_eq!(bf.serialized_size(), 16 + bf.bits.len());
}

#[test]
fn deserialize_rejects_oversized_bloom() {
    let mut buf = Vec::new();
    buf.extend_from_slice(&64u64.to_le_bytes()); // num_bits
    buf.extend_from_slice(&3u32.to_le_bytes()); // num_hashes
    buf.extend_from_slice(&(256 * 1024 * 1024u32).to_le_bytes()); // bits_len = 256 MiB

    let mut cursor = Cursor::new(&buf);
    let result = BloomFilter::read_from(&mut cursor);
    assert!(result.is_err());
}

// -------------------- Debug --------------------

#[test]
fn debug_impl_works() {
    let bf = BloomFilter::new(100, 0.01);
    let debug = format!("{:?}", bf);
    assert!(debug.contains("BloomFilter"));
    assert!(debug.contains("num_bits"));
    assert!(debug.contains("num_hashes"));
}

// -------------------- Edge cases --------------------

#[test]
fn single_item_filter() {
    let mut bf = BloomFilter::new(1, 0.01);
    bf.add(b"only");
    assert!(bf.maybe_contains(b"only"));
}

#[test]
fn very_low_fpr() {
    let bf = BloomFilter::new(100, 0.0001);
    assert!(bf.num_bits() > 1000);
    assert!(bf.num_hashes() > 5);
}

#[test]
fn high_fpr_still_works() {
    let mut bf = BloomFilter::new(100, 0.5);
    bf.add(b"test");
    assert!(bf.maybe_contains(b"test"));
}

#[test]
fn sizing_matches_padded_formula() {
    // Matches the reference bootstrap scenario: n = 3, p = 0.01.
    let bf = BloomFilter::new(3, 0.01);
    let n = 3.0_f64;
    let expected_m = (-(n + SIZE_PADDING) * 0.01_f64.ln() / std::f64::consts::LN_2.powi(2)).ceil() as u64;
    assert_eq!(bf.num_bits(), expected_m.max(8));
}
