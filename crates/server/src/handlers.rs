use crate::activity_log::{ActivityLog, Tag};
use crate::error::ServerError;
use engine::{BlacklistEngine, Tier};
use hashkey::{HashKey, HashPrefix, KEY_LEN, PREFIX_LEN};
use std::sync::Arc;

/// Thin async projection of [`BlacklistEngine`] over the five request
/// surfaces of spec.md §6. Query-parameter parsing and validation
/// (`InputInvalid`) happen here; routing these methods to an actual HTTP
/// framework is the deliberately excluded transport layer (spec.md §1).
pub struct Handlers {
    engine: Arc<BlacklistEngine>,
    log: ActivityLog,
}

impl Handlers {
    pub fn new(engine: Arc<BlacklistEngine>, log: ActivityLog) -> Self {
        Self { engine, log }
    }

    /// `GET /fetch-hashes?client=..&prefix=<hex4>`.
    pub async fn fetch_hashes(&self, client: &str, prefix_hex: &str) -> Result<Vec<u8>, ServerError> {
        let prefix = match parse_prefix(prefix_hex) {
            Ok(p) => p,
            Err(e) => {
                self.log_error(client, &e.to_string()).await;
                return Err(e);
            }
        };

        let bytes = self.engine.full_hashes_for_prefix(&prefix).await;
        self.log
            .append(
                Tag::Get,
                &format!(
                    "{} fetched {} matching hash(es) for prefix {}",
                    client,
                    bytes.len() / KEY_LEN,
                    prefix_hex
                ),
            )
            .await
            .ok();
        Ok(bytes)
    }

    /// `POST /submit-malicious-url?client=..&url=<hex32>`.
    pub async fn submit_malicious_url(&self, client: &str, url_hex: &str) -> Result<(), ServerError> {
        let key = match parse_key(url_hex) {
            Ok(k) => k,
            Err(e) => {
                self.log_error(client, &e.to_string()).await;
                return Err(e);
            }
        };

        match self.engine.ingest(key).await {
            Ok(()) => {
                self.log
                    .append(Tag::Post, &format!("{} blacklisted a new URL", client))
                    .await
                    .ok();
                Ok(())
            }
            Err(e) => {
                let e: ServerError = e.into();
                self.log
                    .append(
                        Tag::Post,
                        &format!("{} attempted to blacklist an existing URL", client),
                    )
                    .await
                    .ok();
                Err(e)
            }
        }
    }

    /// `GET /fetch-prefixes/memtable?client=..&partition=<1..P>`.
    pub async fn fetch_prefixes_memtable(
        &self,
        client: &str,
        partition: usize,
    ) -> Result<Vec<u8>, ServerError> {
        self.fetch_prefixes(client, partition, Tier::Memtable).await
    }

    /// `GET /fetch-prefixes/index?client=..&partition=<1..P>`.
    pub async fn fetch_prefixes_index(
        &self,
        client: &str,
        partition: usize,
    ) -> Result<Vec<u8>, ServerError> {
        self.fetch_prefixes(client, partition, Tier::Index).await
    }

    async fn fetch_prefixes(
        &self,
        client: &str,
        partition: usize,
        tier: Tier,
    ) -> Result<Vec<u8>, ServerError> {
        let bytes = self
            .engine
            .prefix_snapshot(partition, tier)
            .await
            .map_err(ServerError::from);

        match &bytes {
            Ok(b) => {
                self.log
                    .append(
                        Tag::Get,
                        &format!(
                            "{} fetched {} prefix(es) from partition {} ({:?})",
                            client,
                            b.len() / PREFIX_LEN,
                            partition,
                            tier
                        ),
                    )
                    .await
                    .ok();
            }
            Err(e) => {
                self.log_error(client, &e.to_string()).await;
            }
        }
        bytes
    }

    /// `GET /fetch-blacklist-metadata?client=..`.
    pub async fn fetch_blacklist_metadata(&self, client: &str) -> Result<(usize, usize), ServerError> {
        let meta = self.engine.metadata().await;
        self.log
            .append(
                Tag::Get,
                &format!(
                    "{} fetched blacklist metadata ({} keys, {} partitions)",
                    client, meta.total_count, meta.partitions
                ),
            )
            .await
            .ok();
        Ok((meta.total_count, meta.partitions))
    }

    /// `GET /get-logs?client=..`.
    pub async fn get_logs(&self, _client: &str) -> Result<Vec<String>, ServerError> {
        Ok(self.log.current_lines().await?)
    }

    async fn log_error(&self, client: &str, message: &str) {
        self.log
            .append(Tag::Error, &format!("{}: {}", client, message))
            .await
            .ok();
    }
}

/// Parses `prefix=<hex4>`, rejecting anything that doesn't decode to
/// exactly [`PREFIX_LEN`] bytes.
fn parse_prefix(hex_str: &str) -> Result<HashPrefix, ServerError> {
    let bytes = hex::decode(hex_str)
        .map_err(|_| ServerError::InputInvalid(format!("malformed hex prefix {:?}", hex_str)))?;
    HashPrefix::from_slice(&bytes)
        .ok_or_else(|| ServerError::InputInvalid(format!("prefix must be {} bytes", PREFIX_LEN)))
}

/// Parses `url=<hex32>`, rejecting anything that doesn't decode to exactly
/// [`KEY_LEN`] bytes.
fn parse_key(hex_str: &str) -> Result<HashKey, ServerError> {
    let bytes = hex::decode(hex_str)
        .map_err(|_| ServerError::InputInvalid(format!("malformed hex url {:?}", hex_str)))?;
    HashKey::from_slice(&bytes)
        .ok_or_else(|| ServerError::InputInvalid(format!("url hash must be {} bytes", KEY_LEN)))
}
