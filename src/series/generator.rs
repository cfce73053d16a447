use rand::Rng;

use crate::core::rng::{derive_seed, Mulberry32};
use crate::models::{Candle, CandleWindow, Direction};

pub const DEFAULT_WINDOW_SIZE: usize = 60;

const BASE_PRICE: f64 = 1.085;
const BASE_PRICE_SPREAD: f64 = 0.01;
/// Per-candle close perturbation, initial fill vs live ticking.
const INIT_DELTA_SPREAD: f64 = 0.0008;
const LIVE_DELTA_SPREAD: f64 = 0.0009;
const WICK_BASE: f64 = 0.00015;
const WICK_SPREAD: f64 = 0.0002;

/// One continuous chart run for a single instrument.
///
/// Initialization replays a seeded mulberry32 stream, so the same
/// `(instrument, sync_key, bias)` triple always produces the same window.
/// `advance` takes a caller-supplied live RNG and intentionally diverges
/// from the seeded stream; a new session (instrument change or sync_key
/// bump) discards the window and re-seeds.
#[derive(Debug, Clone)]
pub struct SeriesSession {
    instrument_id: String,
    sync_key: u32,
    seed: u32,
    bias: Option<Direction>,
    window: CandleWindow,
    next_index: u64,
}

impl SeriesSession {
    pub fn new(instrument_id: &str, sync_key: u32, bias: Option<Direction>) -> Self {
        Self::with_window_size(instrument_id, sync_key, bias, DEFAULT_WINDOW_SIZE)
    }

    pub fn with_window_size(
        instrument_id: &str,
        sync_key: u32,
        bias: Option<Direction>,
        window_size: usize,
    ) -> Self {
        let seed = derive_seed(instrument_id, sync_key);
        let mut rng = Mulberry32::new(seed);
        let mut window = CandleWindow::new(window_size);

        let mut price = BASE_PRICE + rng.gen::<f64>() * BASE_PRICE_SPREAD;
        for i in 0..window_size as u64 {
            let candle = next_candle(&mut rng, i, price, INIT_DELTA_SPREAD, bias);
            price = candle.close;
            window.push(candle);
        }

        Self {
            instrument_id: instrument_id.to_string(),
            sync_key,
            seed,
            bias,
            window,
            next_index: window_size as u64,
        }
    }

    /// Appends one live candle and evicts the oldest. Open always equals
    /// the previous close, so the series stays continuous across the
    /// seeded and live segments.
    pub fn advance<R: Rng + ?Sized>(&mut self, live_rng: &mut R) -> Candle {
        let open = self
            .window
            .last()
            .map(|c| c.close)
            .unwrap_or(BASE_PRICE);
        let candle = next_candle(live_rng, self.next_index, open, LIVE_DELTA_SPREAD, self.bias);
        self.next_index += 1;
        self.window.push(candle);
        candle
    }

    pub fn instrument_id(&self) -> &str {
        &self.instrument_id
    }

    pub fn sync_key(&self) -> u32 {
        self.sync_key
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn bias(&self) -> Option<Direction> {
        self.bias
    }

    pub fn window(&self) -> &CandleWindow {
        &self.window
    }
}

fn next_candle<R: Rng + ?Sized>(
    rng: &mut R,
    sequence_index: u64,
    open: f64,
    delta_spread: f64,
    bias: Option<Direction>,
) -> Candle {
    // Fixed draw order (delta, wick, high scale, low scale) keeps the
    // seeded stream reproducible.
    let delta = (rng.gen::<f64>() - 0.5) * delta_spread + Direction::bias_factor(bias);
    let close = open + delta;
    let wick = WICK_BASE + rng.gen::<f64>() * WICK_SPREAD;
    let high = open.max(close) + wick * rng.gen::<f64>();
    let low = open.min(close) - wick * rng.gen::<f64>();

    Candle {
        sequence_index,
        open,
        high,
        low,
        close,
    }
}
