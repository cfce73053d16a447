use anyhow::{anyhow, Result};
use async_trait::async_trait;

use signalpro::config::Config;
use signalpro::stats::{RemoteSnapshot, StatsBackend};

pub fn test_config() -> Config {
    let mut cfg = Config::from_env();
    cfg.stats_url = String::new();
    cfg.storage_dir = std::env::temp_dir()
        .join(format!("signalpro_integ_{}", std::process::id()))
        .to_string_lossy()
        .to_string();
    cfg.log_level = "ERROR".to_string();
    cfg
}

/// Backend that always returns the same canned snapshot.
pub struct MockStatsBackend {
    pub snapshot: RemoteSnapshot,
}

#[async_trait]
impl StatsBackend for MockStatsBackend {
    async fn fetch_stats(&self) -> Result<RemoteSnapshot> {
        Ok(self.snapshot)
    }
}

/// Backend that fails every fetch, standing in for a dead stats relay.
pub struct FailingStatsBackend;

#[async_trait]
impl StatsBackend for FailingStatsBackend {
    async fn fetch_stats(&self) -> Result<RemoteSnapshot> {
        Err(anyhow!("connection refused"))
    }
}
