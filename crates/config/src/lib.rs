//! # Config
//!
//! Process-wide configuration for the engine and server, loaded once at
//! startup and then passed down through request handlers as plain data —
//! never a module-scope singleton.
//!
//! Every knob has a compiled-in default matching the on-disk contract
//! (`P = 4` partitions, `N = 15625` keys per index file, 4-byte prefixes)
//! and can be overridden by an environment variable, following the same
//! `env_or` convention the rest of this workspace uses for its own process
//! configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable was set but couldn't be parsed as the
    /// expected type.
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Engine-side configuration: partition count, flush threshold, and the
/// directory layout index files and WALs live under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of partitions, `P`.
    pub partitions: usize,
    /// Keys per index file, `N`. A memtable flushes once it holds this many.
    pub keys_per_index_file: usize,
    /// Root directory under which `db/` and `log/` live.
    pub data_dir: PathBuf,
    /// Whether WAL appends are followed by an fsync.
    pub wal_sync: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            partitions: 4,
            keys_per_index_file: 15_625,
            data_dir: PathBuf::from("data"),
            wal_sync: true,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from the environment, falling back to defaults
    /// for anything unset.
    ///
    /// | Variable                      | Default   |
    /// |--------------------------------|-----------|
    /// | `BLACKLIST_PARTITIONS`          | `4`       |
    /// | `BLACKLIST_KEYS_PER_INDEX_FILE` | `15625`   |
    /// | `BLACKLIST_DATA_DIR`            | `data`    |
    /// | `BLACKLIST_WAL_SYNC`            | `true`    |
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            partitions: env_parse("BLACKLIST_PARTITIONS", defaults.partitions)?,
            keys_per_index_file: env_parse(
                "BLACKLIST_KEYS_PER_INDEX_FILE",
                defaults.keys_per_index_file,
            )?,
            data_dir: PathBuf::from(env_or("BLACKLIST_DATA_DIR", "data")),
            wal_sync: env_parse("BLACKLIST_WAL_SYNC", defaults.wal_sync)?,
        })
    }

    /// Directory holding partition `partition`'s (0-based) index files.
    ///
    /// On disk, partitions are numbered starting at 1 — the external
    /// contract the prefix endpoints also use.
    pub fn partition_dir(&self, partition: usize) -> PathBuf {
        self.data_dir
            .join("db")
            .join(format!("partition{}", partition + 1))
    }

    /// Path to partition `partition`'s (0-based) WAL file.
    pub fn wal_path(&self, partition: usize) -> PathBuf {
        self.data_dir
            .join("log")
            .join("write_ahead")
            .join(format!("partition{}.bin", partition + 1))
    }

    /// Directory holding the server's activity log files.
    pub fn activity_log_dir(&self) -> PathBuf {
        self.data_dir.join("log").join("activity")
    }
}

/// Server-side configuration: wraps [`EngineConfig`] with knobs specific to
/// the request-handling layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub engine: EngineConfig,
    /// Width in bytes of the wire-level hash prefix.
    pub prefix_len: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            prefix_len: 4,
        }
    }
}

impl ServerConfig {
    /// Loads server configuration from the environment.
    ///
    /// | Variable               | Default |
    /// |-------------------------|---------|
    /// | `BLACKLIST_PREFIX_LEN`  | `4`     |
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            engine: EngineConfig::from_env()?,
            prefix_len: env_parse("BLACKLIST_PREFIX_LEN", defaults.prefix_len)?,
        })
    }
}

/// Client-side configuration: where the local bloom filter blob lives and
/// the target false-positive rate it's sized for on rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Path to the persisted, opaque bloom filter blob.
    pub filter_path: PathBuf,
    /// Target false-positive rate used when sizing a rebuilt filter.
    pub target_false_positive_rate: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            filter_path: PathBuf::from("data/local/bloom_filter.bin"),
            target_false_positive_rate: 0.01,
        }
    }
}

impl ClientConfig {
    /// Loads client configuration from the environment.
    ///
    /// | Variable                              | Default                      |
    /// |-----------------------------------------|-------------------------------|
    /// | `BLACKLIST_FILTER_PATH`                  | `data/local/bloom_filter.bin` |
    /// | `BLACKLIST_TARGET_FALSE_POSITIVE_RATE`   | `0.01`                        |
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            filter_path: PathBuf::from(env_or(
                "BLACKLIST_FILTER_PATH",
                defaults.filter_path.to_str().unwrap_or_default(),
            )),
            target_false_positive_rate: env_parse(
                "BLACKLIST_TARGET_FALSE_POSITIVE_RATE",
                defaults.target_false_positive_rate,
            )?,
        })
    }
}

fn env_or(key: &'static str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Err(_) => Ok(default),
        Ok(value) => value.parse().map_err(|_| ConfigError::InvalidValue { var: key, value }),
    }
}

#[cfg(test)]
mod tests;
