use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

use crate::models::Outcome;

pub const USER_DATA_KEY: &str = "signalpro_user_data";
pub const STREAK_KEY: &str = "signalpro_streak";
/// A bonus fires every five consecutive wins.
pub const STREAK_MILESTONE: u32 = 5;

/// Key-value capability injected into the caller. The simulation engines
/// never touch storage; only the driver reads and writes through this.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn clear(&mut self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    map: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.map.insert(key.to_string(), value.to_string());
    }

    fn clear(&mut self, key: &str) {
        self.map.remove(key);
    }
}

/// One file per key under a configured directory. Write failures are
/// logged and swallowed; losing a streak value must never stop the
/// simulation.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!("Failed to create storage dir {}: {}", dir.display(), e);
        }
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Err(e) = fs::write(self.path_for(key), value) {
            warn!("Failed to persist {}: {}", key, e);
        }
    }

    fn clear(&mut self, key: &str) {
        let _ = fs::remove_file(self.path_for(key));
    }
}

/// Where the visitor is in the funnel. Read at startup to decide whether
/// the platform-selection step can be skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserJourney {
    pub platform: Option<String>,
    pub profile_id: Option<String>,
    pub has_completed_registration: bool,
    pub last_visit: String,
}

impl Default for UserJourney {
    fn default() -> Self {
        Self {
            platform: None,
            profile_id: None,
            has_completed_registration: false,
            last_visit: Utc::now().to_rfc3339(),
        }
    }
}

impl UserJourney {
    pub fn can_skip_platform_step(&self) -> bool {
        self.platform.is_some() && self.has_completed_registration
    }
}

/// Missing or corrupt records fall back to a fresh journey.
pub fn load_user_journey(store: &dyn KvStore) -> UserJourney {
    store
        .get(USER_DATA_KEY)
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

/// Persists the journey with a refreshed last-visit timestamp.
pub fn save_user_journey(store: &mut dyn KvStore, journey: &UserJourney) {
    let mut journey = journey.clone();
    journey.last_visit = Utc::now().to_rfc3339();
    match serde_json::to_string(&journey) {
        Ok(raw) => store.set(USER_DATA_KEY, &raw),
        Err(e) => warn!("Failed to serialize user journey: {}", e),
    }
}

pub fn load_streak(store: &dyn KvStore) -> u32 {
    store
        .get(STREAK_KEY)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(0)
}

/// Win extends the streak, loss resets it. Returns the new value.
pub fn record_outcome(store: &mut dyn KvStore, outcome: Outcome) -> u32 {
    let streak = match outcome {
        Outcome::Win => load_streak(store) + 1,
        Outcome::Loss => 0,
        Outcome::Pending => return load_streak(store),
    };
    store.set(STREAK_KEY, &streak.to_string());
    streak
}

pub fn is_streak_milestone(streak: u32) -> bool {
    streak > 0 && streak % STREAK_MILESTONE == 0
}
