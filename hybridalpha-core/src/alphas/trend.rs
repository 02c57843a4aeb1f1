//! Trend alpha: distance of close above its fast and slow SMAs.
//!
//! score = clip(0.6 × (close − sma_fast) / close + 0.4 × (close − sma_slow) / close)

use super::clip_unit;
use crate::domain::Bar;
use crate::indicators::{Indicator, Sma};

const FAST_WEIGHT: f64 = 0.6;
const SLOW_WEIGHT: f64 = 0.4;

pub fn trend_alpha(bars: &[Bar], fast: usize, slow: usize) -> Vec<f64> {
    let fast_ma = Sma::new(fast).compute(bars);
    let slow_ma = Sma::new(slow).compute(bars);
    bars.iter()
        .zip(fast_ma.iter().zip(slow_ma.iter()))
        .map(|(bar, (f, s))| {
            let price = bar.close;
            let dist_fast = (price - f) / price;
            let dist_slow = (price - s) / price;
            clip_unit(FAST_WEIGHT * dist_fast + SLOW_WEIGHT * dist_slow)
        })
        .collect()
}
