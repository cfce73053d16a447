use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use signalpro::config::SharedConfig;
use signalpro::models::Outcome;
use signalpro::series::SeriesSession;
use signalpro::signal::{format_clock, SignalEngine, SignalEvent, ANALYSIS_STAGES};
use signalpro::stats::{RemoteStats, StatsBackend, StatsSimulator};
use signalpro::storage::{self, FileStore, KvStore};

/// Pause between a resolved signal and the automatic refresh.
const REFRESH_GRACE: Duration = Duration::from_secs(5);
const BASE_TICK: Duration = Duration::from_millis(100);

/// Owns one full funnel session: the chart series, the signal lifecycle,
/// the stats counters and every timer cadence driving them. Dropping the
/// app tears all of it down; there is no global timer registry.
pub struct FunnelApp {
    config: SharedConfig,
    series: SeriesSession,
    engine: SignalEngine,
    stats: StatsSimulator,
    backend: Option<Box<dyn StatsBackend>>,
    store: Box<dyn KvStore>,
    rng: StdRng,
    sync_key: u32,

    last_stage_tick: Instant,
    last_second_tick: Instant,
    last_candle_tick: Instant,
    last_stats_tick: Instant,
    last_sync: Instant,
    resolved_at: Option<Instant>,
}

impl FunnelApp {
    pub async fn new(config: SharedConfig) -> Result<Self> {
        let cfg = config.read().await.clone();
        let mut rng = StdRng::from_entropy();

        info!("{}", "=".repeat(60));
        info!("SignalPro simulator starting up");
        info!("Instrument: {}", cfg.instrument);
        info!(
            "Expiration: {} | Win probability: {:.0}%",
            format_clock(cfg.expiration_secs),
            cfg.win_probability * 100.0
        );
        info!("{}", "=".repeat(60));

        let mut store: Box<dyn KvStore> = Box::new(FileStore::new(&cfg.storage_dir));

        let mut journey = storage::load_user_journey(store.as_ref());
        if journey.can_skip_platform_step() {
            info!(
                "Returning visitor on {} — skipping platform selection",
                journey.platform.as_deref().unwrap_or("?")
            );
        }
        journey.platform.get_or_insert_with(|| "pocketoption".to_string());
        storage::save_user_journey(store.as_mut(), &journey);

        let series = SeriesSession::with_window_size(&cfg.instrument, 0, None, cfg.window_size);
        let mut engine = SignalEngine::new(&cfg);
        engine.start(&cfg.instrument, cfg.expiration_secs)?;
        info!("{}", ANALYSIS_STAGES[0]);

        let stats = StatsSimulator::new(&cfg, None, &mut rng);
        let backend: Option<Box<dyn StatsBackend>> = if cfg.stats_url.is_empty() {
            info!("No stats endpoint configured — running fully local");
            None
        } else {
            Some(Box::new(RemoteStats::new(&cfg)))
        };

        let now = Instant::now();
        Ok(Self {
            config,
            series,
            engine,
            stats,
            backend,
            store,
            rng,
            sync_key: 0,
            last_stage_tick: now,
            last_second_tick: now,
            last_candle_tick: now,
            last_stats_tick: now,
            last_sync: now,
            resolved_at: None,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        info!("Simulator running. Press Ctrl+C to stop.");
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    self.shutdown();
                    return Ok(());
                }
                _ = self.tick() => {}
            }
        }
    }

    async fn tick(&mut self) {
        let cfg = self.config.read().await.clone();

        // Fast tick: cosmetic analysis pipeline.
        if self.last_stage_tick.elapsed().as_millis() as u64 >= cfg.stage_interval_ms {
            match self.engine.tick_stage(&mut self.rng) {
                Some(SignalEvent::StageAdvanced { label, .. }) => info!("{}", label),
                Some(SignalEvent::SignalIssued(signal)) => {
                    info!("{}", "=".repeat(60));
                    info!(
                        "SIGNAL — {} {} | Confidence: {}%",
                        self.engine.instrument(),
                        signal.direction,
                        signal.confidence
                    );
                    info!("  Expires in {}", format_clock(signal.remaining_secs));
                    info!("{}", "=".repeat(60));

                    // Fresh signal: re-seed the chart tilted toward the call.
                    self.sync_key += 1;
                    self.series = SeriesSession::with_window_size(
                        self.engine.instrument(),
                        self.sync_key,
                        Some(signal.direction),
                        cfg.window_size,
                    );
                }
                _ => {}
            }
            self.last_stage_tick = Instant::now();
        }

        // One-second tick: countdown and resolution.
        if self.last_second_tick.elapsed().as_secs() >= 1 {
            match self.engine.tick_second(&mut self.rng) {
                Some(SignalEvent::Countdown { remaining_secs }) => {
                    debug!("Expires in {}", format_clock(remaining_secs));
                }
                Some(SignalEvent::Resolved(outcome)) => self.on_resolved(outcome),
                _ => {}
            }
            self.last_second_tick = Instant::now();
        }

        // Candle advancement.
        if self.last_candle_tick.elapsed().as_millis() as u64 >= cfg.candle_interval_ms {
            let candle = self.series.advance(&mut self.rng);
            debug!(
                "{} {:.5} ({:+.3}%)",
                self.series.instrument_id(),
                candle.close,
                self.series.window().change_percent()
            );
            self.last_candle_tick = Instant::now();
        }

        // Stats smoothing.
        if self.last_stats_tick.elapsed().as_secs() >= cfg.stats_tick_secs {
            let snap = self.stats.tick(None, &mut self.rng);
            debug!(
                "online={} signals={} profit=${} winrate={}%",
                snap.online_count, snap.signals_count, snap.profit, snap.win_rate
            );
            self.last_stats_tick = Instant::now();
        }

        // Remote reconciliation; failure keeps the local trajectory.
        if self.backend.is_some() && self.last_sync.elapsed().as_secs() >= cfg.stats_sync_secs {
            self.sync_stats().await;
            self.last_sync = Instant::now();
        }

        // Automatic refresh a little after resolution.
        if self
            .resolved_at
            .is_some_and(|at| at.elapsed() >= REFRESH_GRACE)
        {
            self.resolved_at = None;
            if self.engine.refresh() {
                if let Err(e) = self
                    .engine
                    .start(&cfg.instrument, cfg.expiration_secs)
                {
                    warn!("Failed to restart signal: {}", e);
                } else {
                    self.sync_key += 1;
                    self.series = SeriesSession::with_window_size(
                        &cfg.instrument,
                        self.sync_key,
                        None,
                        cfg.window_size,
                    );
                    info!("{}", ANALYSIS_STAGES[0]);
                }
            }
        }

        tokio::time::sleep(BASE_TICK).await;
    }

    fn on_resolved(&mut self, outcome: Outcome) {
        let streak = storage::record_outcome(self.store.as_mut(), outcome);
        match outcome {
            Outcome::Win => {
                info!("Signal resolved: WIN (streak: {})", streak);
                if storage::is_streak_milestone(streak) {
                    info!("Streak bonus x{}!", streak / storage::STREAK_MILESTONE);
                }
            }
            Outcome::Loss => info!("Signal resolved: LOSS (streak reset)"),
            Outcome::Pending => {}
        }
        self.resolved_at = Some(Instant::now());
    }

    async fn sync_stats(&mut self) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        match backend.fetch_stats().await {
            Ok(remote) => {
                self.stats.apply_remote(&remote);
                debug!(
                    "Stats reconciled from server: online={} signals={}",
                    remote.online_count, remote.signals_count
                );
            }
            Err(e) => {
                debug!("Stats sync failed, continuing local simulation: {}", e);
            }
        }
    }

    fn shutdown(&mut self) {
        info!("Shutting down...");
        let snap = self.stats.snapshot();
        info!(
            "Final stats: online={} signals={} profit=${} winrate={}%",
            snap.online_count, snap.signals_count, snap.profit, snap.win_rate
        );
        info!("Streak: {}", storage::load_streak(self.store.as_ref()));
        info!("Simulator stopped.");
    }
}
