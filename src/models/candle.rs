use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Candle {
    pub sequence_index: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn total_range(&self) -> f64 {
        self.high - self.low
    }

    pub fn upper_wick(&self) -> f64 {
        self.high - self.close.max(self.open)
    }

    pub fn lower_wick(&self) -> f64 {
        self.close.min(self.open) - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// OHLC well-formedness: the wicks bracket the body.
    pub fn is_valid(&self) -> bool {
        self.low <= self.open.min(self.close) && self.high >= self.open.max(self.close)
    }
}

/// Fixed-capacity sliding window of candles. Pushing beyond capacity
/// evicts the oldest bar (FIFO), so the window never grows past its bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandleWindow {
    candles: VecDeque<Candle>,
    capacity: usize,
}

impl CandleWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            candles: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn push(&mut self, candle: Candle) {
        if self.candles.len() == self.capacity {
            self.candles.pop_front();
        }
        self.candles.push_back(candle);
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    pub fn first(&self) -> Option<&Candle> {
        self.candles.front()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candle> {
        self.candles.iter()
    }

    pub fn highs_max(&self) -> f64 {
        self.candles
            .iter()
            .map(|c| c.high)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn lows_min(&self) -> f64 {
        self.candles
            .iter()
            .map(|c| c.low)
            .fold(f64::INFINITY, f64::min)
    }

    /// Percent move from the first open to the last close.
    pub fn change_percent(&self) -> f64 {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) if first.open != 0.0 => {
                (last.close - first.open) / first.open * 100.0
            }
            _ => 0.0,
        }
    }

    /// Chart y-axis bounds: min/max of the window padded by 8% of the range.
    pub fn y_domain(&self) -> (f64, f64) {
        if self.candles.is_empty() {
            return (0.0, 0.0);
        }
        let min = self.lows_min();
        let max = self.highs_max();
        let pad = (max - min) * 0.08;
        (min - pad, max + pad)
    }
}
