use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

pub type SharedConfig = Arc<RwLock<Config>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Funnel selection defaults
    pub instrument: String,
    pub expiration_secs: u32,

    // Chart
    pub window_size: usize,
    pub candle_interval_ms: u64,

    // Signal lifecycle
    pub stage_interval_ms: u64,
    pub win_probability: f64,
    pub confidence_min: u8,
    pub confidence_max: u8,

    // Stats simulation
    pub stats_tick_secs: u64,
    pub stats_sync_secs: u64,
    pub online_floor: i64,
    pub online_blend: f64,
    pub win_rate: u8,
    pub stats_url: String,

    // Storage
    pub storage_dir: String,

    // Logging
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        Config {
            instrument: env("INSTRUMENT", "EUR/USD"),
            expiration_secs: env("EXPIRATION_SECS", "60").parse().unwrap_or(60),
            window_size: 60,
            candle_interval_ms: 800,
            stage_interval_ms: 400,
            win_probability: env("WIN_PROBABILITY", "0.8").parse().unwrap_or(0.8),
            confidence_min: 78,
            confidence_max: 96,
            stats_tick_secs: 5,
            stats_sync_secs: env("STATS_SYNC_SECS", "30").parse().unwrap_or(30),
            online_floor: 200,
            online_blend: 0.1,
            win_rate: 96,
            stats_url: env("STATS_URL", ""),
            storage_dir: env("STORAGE_DIR", "data"),
            log_level: env("LOG_LEVEL", "INFO"),
        }
    }

    pub fn shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }
}
