use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Config;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Wire shape of the stats relay endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSnapshot {
    pub online_count: i64,
    pub signals_count: i64,
    pub profit: i64,
    pub win_rate: u8,
    #[serde(default)]
    pub timestamp: i64,
}

/// Source of authoritative stats snapshots. A fetch failure is recoverable
/// by design: the caller keeps the locally simulated trajectory.
#[async_trait]
pub trait StatsBackend: Send + Sync {
    async fn fetch_stats(&self) -> Result<RemoteSnapshot>;
}

pub struct RemoteStats {
    client: Client,
    url: String,
}

impl RemoteStats {
    pub fn new(cfg: &Config) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            url: cfg.stats_url.clone(),
        }
    }
}

#[async_trait]
impl StatsBackend for RemoteStats {
    async fn fetch_stats(&self) -> Result<RemoteSnapshot> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("stats request failed")?
            .error_for_status()
            .context("stats endpoint returned an error status")?;

        response
            .json::<RemoteSnapshot>()
            .await
            .context("malformed stats payload")
    }
}
