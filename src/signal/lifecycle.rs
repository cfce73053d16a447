use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::models::{Direction, Outcome};

/// Stage labels shown while the fake analysis pipeline runs. Cosmetic
/// only; one stage per fast tick, and the signal is drawn when the last
/// stage completes.
pub const ANALYSIS_STAGES: &[&str] = &[
    "Connecting to server...",
    "Syncing chart...",
    "Analyzing candlestick pattern...",
    "Checking RSI and MACD indicators...",
    "Analyzing volumes...",
    "Calculating probability...",
    "Generating signal...",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalState {
    Idle,
    Analyzing,
    Active,
    Resolved,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Signal {
    pub direction: Direction,
    pub confidence: u8,
    pub expiration_secs: u32,
    pub remaining_secs: u32,
    pub outcome: Outcome,
}

#[derive(Debug, Clone)]
pub enum SignalEvent {
    StageAdvanced { stage: usize, label: &'static str },
    SignalIssued(Signal),
    Countdown { remaining_secs: u32 },
    Resolved(Outcome),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignalError {
    #[error("expiration must be a positive number of seconds")]
    InvalidExpiration,
    #[error("instrument id must not be blank")]
    InvalidInstrument,
}

/// Signal lifecycle state machine:
/// `Idle -> Analyzing -> Active -> Resolved -> Idle (refresh)`.
///
/// `start` restarts analysis from any state (the funnel re-runs whenever
/// platform/pair/expiration change); `refresh` is only honored in
/// Resolved, which is what enforces one signal at a time. The engine does
/// no I/O and draws all randomness from the RNG handed to each tick.
#[derive(Debug)]
pub struct SignalEngine {
    state: SignalState,
    stage: usize,
    instrument: String,
    expiration_secs: u32,
    signal: Option<Signal>,
    win_probability: f64,
    confidence_min: u8,
    confidence_max: u8,
}

impl SignalEngine {
    pub fn new(cfg: &Config) -> Self {
        Self {
            state: SignalState::Idle,
            stage: 0,
            instrument: String::new(),
            expiration_secs: 0,
            signal: None,
            win_probability: cfg.win_probability.clamp(0.0, 1.0),
            confidence_min: cfg.confidence_min,
            confidence_max: cfg.confidence_max,
        }
    }

    /// Begins a new analysis run. Rejects bad input before touching any
    /// state, then clears the previous signal and enters Analyzing.
    pub fn start(&mut self, instrument: &str, expiration_secs: u32) -> Result<(), SignalError> {
        if expiration_secs == 0 {
            return Err(SignalError::InvalidExpiration);
        }
        if instrument.trim().is_empty() {
            return Err(SignalError::InvalidInstrument);
        }

        self.instrument = instrument.to_string();
        self.expiration_secs = expiration_secs;
        self.signal = None;
        self.stage = 0;
        self.state = SignalState::Analyzing;
        Ok(())
    }

    /// Fast tick: advances the analysis pipeline one stage. On the final
    /// stage the directional call is drawn and the countdown arms.
    pub fn tick_stage<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<SignalEvent> {
        if self.state != SignalState::Analyzing {
            return None;
        }

        if self.stage + 1 < ANALYSIS_STAGES.len() {
            self.stage += 1;
            return Some(SignalEvent::StageAdvanced {
                stage: self.stage,
                label: ANALYSIS_STAGES[self.stage],
            });
        }

        let direction = if rng.gen_bool(0.5) {
            Direction::Up
        } else {
            Direction::Down
        };
        let confidence = rng.gen_range(self.confidence_min..=self.confidence_max);

        let signal = Signal {
            direction,
            confidence,
            expiration_secs: self.expiration_secs,
            remaining_secs: self.expiration_secs,
            outcome: Outcome::Pending,
        };
        self.signal = Some(signal);
        self.state = SignalState::Active;
        Some(SignalEvent::SignalIssued(signal))
    }

    /// One-second tick: counts down toward expiration. The countdown hits
    /// exactly zero, then the outcome is drawn and the signal freezes.
    pub fn tick_second<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<SignalEvent> {
        if self.state != SignalState::Active {
            return None;
        }
        let signal = self.signal.as_mut()?;

        signal.remaining_secs = signal.remaining_secs.saturating_sub(1);
        if signal.remaining_secs > 0 {
            return Some(SignalEvent::Countdown {
                remaining_secs: signal.remaining_secs,
            });
        }

        let outcome = if rng.gen_bool(self.win_probability) {
            Outcome::Win
        } else {
            Outcome::Loss
        };
        signal.outcome = outcome;
        self.state = SignalState::Resolved;
        Some(SignalEvent::Resolved(outcome))
    }

    /// Returns to Idle so a new signal can be requested. Ignored unless
    /// the current signal has resolved.
    pub fn refresh(&mut self) -> bool {
        if self.state != SignalState::Resolved {
            return false;
        }
        self.signal = None;
        self.stage = 0;
        self.state = SignalState::Idle;
        true
    }

    pub fn state(&self) -> SignalState {
        self.state
    }

    pub fn signal(&self) -> Option<&Signal> {
        self.signal.as_ref()
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn current_stage(&self) -> Option<(usize, &'static str)> {
        match self.state {
            SignalState::Analyzing => Some((self.stage, ANALYSIS_STAGES[self.stage])),
            _ => None,
        }
    }
}

/// Countdown display, `m:ss` as shown next to the expiration timer.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::default_test_config;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn engine() -> SignalEngine {
        SignalEngine::new(&default_test_config())
    }

    fn run_analysis(e: &mut SignalEngine, rng: &mut StdRng) -> Signal {
        loop {
            if let Some(SignalEvent::SignalIssued(s)) = e.tick_stage(rng) {
                return s;
            }
        }
    }

    #[test]
    fn start_rejects_zero_expiration() {
        let mut e = engine();
        assert_eq!(e.start("EUR/USD", 0), Err(SignalError::InvalidExpiration));
        assert_eq!(e.state(), SignalState::Idle);
    }

    #[test]
    fn start_rejects_blank_instrument() {
        let mut e = engine();
        assert_eq!(e.start("   ", 60), Err(SignalError::InvalidInstrument));
        assert_eq!(e.state(), SignalState::Idle);
        assert!(e.signal().is_none());
    }

    #[test]
    fn analysis_runs_all_stages_then_issues() {
        let mut e = engine();
        let mut rng = StdRng::seed_from_u64(1);
        e.start("EUR/USD", 60).unwrap();
        assert_eq!(e.current_stage(), Some((0, ANALYSIS_STAGES[0])));

        let mut stage_events = 0;
        let signal = loop {
            match e.tick_stage(&mut rng) {
                Some(SignalEvent::StageAdvanced { .. }) => stage_events += 1,
                Some(SignalEvent::SignalIssued(s)) => break s,
                other => panic!("unexpected event: {other:?}"),
            }
        };

        // 7 labels: stage 0 shows at start, 6 advances, then the draw.
        assert_eq!(stage_events, ANALYSIS_STAGES.len() - 1);
        assert_eq!(e.state(), SignalState::Active);
        assert!((78..=96).contains(&signal.confidence));
        assert_eq!(signal.remaining_secs, 60);
        assert_eq!(signal.outcome, Outcome::Pending);
    }

    #[test]
    fn countdown_is_monotonic_and_resolves_at_zero() {
        let mut e = engine();
        let mut rng = StdRng::seed_from_u64(2);
        e.start("EUR/USD", 5).unwrap();
        run_analysis(&mut e, &mut rng);

        let mut last = 5;
        loop {
            match e.tick_second(&mut rng) {
                Some(SignalEvent::Countdown { remaining_secs }) => {
                    assert!(remaining_secs < last);
                    last = remaining_secs;
                }
                Some(SignalEvent::Resolved(outcome)) => {
                    assert!(outcome.is_terminal());
                    break;
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }

        let signal = e.signal().unwrap();
        assert_eq!(signal.remaining_secs, 0);
        assert!(signal.outcome.is_terminal());
        assert_eq!(e.state(), SignalState::Resolved);
    }

    #[test]
    fn refresh_is_single_flight() {
        let mut e = engine();
        let mut rng = StdRng::seed_from_u64(3);
        e.start("EUR/USD", 60).unwrap();
        assert!(!e.refresh(), "refresh must be ignored while analyzing");

        run_analysis(&mut e, &mut rng);
        let before = e.signal().unwrap().remaining_secs;
        assert!(!e.refresh(), "refresh must be ignored while active");
        assert_eq!(e.signal().unwrap().remaining_secs, before);
        assert_eq!(e.state(), SignalState::Active);
    }

    #[test]
    fn refresh_after_resolution_returns_to_idle() {
        let mut e = engine();
        let mut rng = StdRng::seed_from_u64(4);
        e.start("EUR/USD", 1).unwrap();
        run_analysis(&mut e, &mut rng);
        e.tick_second(&mut rng);
        assert_eq!(e.state(), SignalState::Resolved);

        assert!(e.refresh());
        assert_eq!(e.state(), SignalState::Idle);
        assert!(e.signal().is_none());
    }

    #[test]
    fn resolved_signal_is_frozen() {
        let mut e = engine();
        let mut rng = StdRng::seed_from_u64(5);
        e.start("EUR/USD", 1).unwrap();
        run_analysis(&mut e, &mut rng);
        e.tick_second(&mut rng);

        let frozen = *e.signal().unwrap();
        assert!(e.tick_second(&mut rng).is_none());
        assert!(e.tick_stage(&mut rng).is_none());
        let still = e.signal().unwrap();
        assert_eq!(still.remaining_secs, frozen.remaining_secs);
        assert_eq!(still.outcome, frozen.outcome);
    }

    #[test]
    fn start_restarts_from_active() {
        let mut e = engine();
        let mut rng = StdRng::seed_from_u64(6);
        e.start("EUR/USD", 60).unwrap();
        run_analysis(&mut e, &mut rng);

        // Changing the pair mid-countdown restarts analysis.
        e.start("GBP/USD", 120).unwrap();
        assert_eq!(e.state(), SignalState::Analyzing);
        assert!(e.signal().is_none());
        assert_eq!(e.instrument(), "GBP/USD");
    }

    #[test]
    fn ticks_are_noops_when_idle() {
        let mut e = engine();
        let mut rng = StdRng::seed_from_u64(7);
        assert!(e.tick_stage(&mut rng).is_none());
        assert!(e.tick_second(&mut rng).is_none());
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(59), "0:59");
        assert_eq!(format_clock(60), "1:00");
        assert_eq!(format_clock(305), "5:05");
    }
}
