use chrono::{DateTime, Local, NaiveDate, Timelike};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::stats::remote::RemoteSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub online_count: i64,
    pub signals_count: i64,
    pub profit: i64,
    pub win_rate: u8,
}

/// Site-wide counters following a diurnal curve. Each tick blends the
/// online count 10% toward the current time-of-day target with a little
/// jitter, and stochastically grows the two cumulative counters; the win
/// rate is a constant. Crossing local midnight zeroes signals and profit
/// only.
#[derive(Debug)]
pub struct StatsSimulator {
    snapshot: StatsSnapshot,
    floor: i64,
    blend: f64,
    win_rate: u8,
    last_date: NaiveDate,
}

impl StatsSimulator {
    pub fn new<R: Rng + ?Sized>(cfg: &Config, now: Option<DateTime<Local>>, rng: &mut R) -> Self {
        let now = now.unwrap_or_else(Local::now);
        let minutes = i64::from(now.hour() * 60 + now.minute());

        // Cold-start counters sized to the time already elapsed today:
        // roughly 18 signals and $48 profit per hour.
        let snapshot = StatsSnapshot {
            online_count: diurnal_target(now.hour(), rng),
            signals_count: (minutes as f64 * 0.3) as i64 + rng.gen_range(0..20),
            profit: (minutes as f64 * 0.8) as i64 + rng.gen_range(0..100),
            win_rate: cfg.win_rate,
        };

        Self {
            snapshot,
            floor: cfg.online_floor,
            blend: cfg.online_blend,
            win_rate: cfg.win_rate,
            last_date: now.date_naive(),
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.snapshot
    }

    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        now: Option<DateTime<Local>>,
        rng: &mut R,
    ) -> StatsSnapshot {
        let now = now.unwrap_or_else(Local::now);
        self.rollover_if_new_day(now.date_naive());

        let target = diurnal_target(now.hour(), rng);
        let prev = self.snapshot.online_count;
        let blended = prev
            + ((target - prev) as f64 * self.blend).floor() as i64
            + rng.gen_range(0..10)
            - 5;
        self.snapshot.online_count = blended.max(self.floor);

        if rng.gen_bool(0.5) {
            self.snapshot.signals_count += rng.gen_range(1..=3);
        }
        if rng.gen_bool(0.7) {
            self.snapshot.profit += 10 + rng.gen_range(0..50);
        }
        self.snapshot.win_rate = self.win_rate;

        self.snapshot
    }

    /// Overwrites local state with an authoritative remote snapshot.
    pub fn apply_remote(&mut self, remote: &RemoteSnapshot) {
        self.snapshot = StatsSnapshot {
            online_count: remote.online_count,
            signals_count: remote.signals_count,
            profit: remote.profit,
            win_rate: remote.win_rate,
        };
    }

    fn rollover_if_new_day(&mut self, today: NaiveDate) {
        if today != self.last_date {
            self.snapshot.signals_count = 0;
            self.snapshot.profit = 0;
            self.last_date = today;
        }
    }
}

/// Baseline online-user count for the local hour: quiet nights, a morning
/// ramp, a busy day plateau, then a tapering evening.
pub fn diurnal_target<R: Rng + ?Sized>(hour: u32, rng: &mut R) -> i64 {
    match hour {
        0..=5 => 200 + rng.gen_range(0..200),
        6..=9 => 400 + i64::from(hour - 6) * 100 + rng.gen_range(0..100),
        10..=17 => 1000 + rng.gen_range(0..500),
        18..=21 => 800 + rng.gen_range(0..400),
        _ => 400 + rng.gen_range(0..200),
    }
}
