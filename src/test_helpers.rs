use chrono::{DateTime, Local, TimeZone};

use crate::config::Config;

/// A Config with the production constants but no env lookups.
pub fn default_test_config() -> Config {
    Config {
        instrument: "EUR/USD".to_string(),
        expiration_secs: 60,
        window_size: 60,
        candle_interval_ms: 800,
        stage_interval_ms: 400,
        win_probability: 0.8,
        confidence_min: 78,
        confidence_max: 96,
        stats_tick_secs: 5,
        stats_sync_secs: 30,
        online_floor: 200,
        online_blend: 0.1,
        win_rate: 96,
        stats_url: String::new(),
        storage_dir: std::env::temp_dir()
            .join("signalpro_test")
            .to_string_lossy()
            .to_string(),
        log_level: "ERROR".to_string(),
    }
}

/// A local timestamp on a fixed date, for exercising diurnal buckets.
pub fn local_time(hour: u32, minute: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2026, 1, 15, hour, minute, 0)
        .unwrap()
}
