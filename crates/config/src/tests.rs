use super::*;

#[test]
fn default_engine_config_matches_on_disk_contract() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.partitions, 4);
    assert_eq!(cfg.keys_per_index_file, 15_625);
    assert!(cfg.wal_sync);
}

#[test]
fn partition_dir_is_one_indexed_on_disk() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.partition_dir(0), PathBuf::from("data/db/partition1"));
    assert_eq!(cfg.partition_dir(3), PathBuf::from("data/db/partition4"));
}

#[test]
fn wal_path_is_one_indexed_on_disk() {
    let cfg = EngineConfig::default();
    assert_eq!(
        cfg.wal_path(2),
        PathBuf::from("data/log/write_ahead/partition3.bin")
    );
}

#[test]
fn activity_log_dir_is_under_data_log() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.activity_log_dir(), PathBuf::from("data/log/activity"));
}

#[test]
fn default_server_config_has_four_byte_prefix() {
    let cfg = ServerConfig::default();
    assert_eq!(cfg.prefix_len, 4);
    assert_eq!(cfg.engine.partitions, 4);
}

#[test]
fn default_client_config_targets_one_percent_false_positives() {
    let cfg = ClientConfig::default();
    assert_eq!(cfg.target_false_positive_rate, 0.01);
    assert_eq!(cfg.filter_path, PathBuf::from("data/local/bloom_filter.bin"));
}

#[test]
fn env_parse_falls_back_to_default_when_unset() {
    std::env::remove_var("BLACKLIST_TEST_UNSET_PARTITIONS_XYZ");
    let v: usize = env_parse("BLACKLIST_TEST_UNSET_PARTITIONS_XYZ", 7).unwrap();
    assert_eq!(v, 7);
}

#[test]
fn env_parse_rejects_unparseable_value() {
    std::env::set_var("BLACKLIST_TEST_BAD_VALUE_XYZ", "not-a-number");
    let result: Result<usize, ConfigError> = env_parse("BLACKLIST_TEST_BAD_VALUE_XYZ", 7);
    std::env::remove_var("BLACKLIST_TEST_BAD_VALUE_XYZ");
    assert!(result.is_err());
}
