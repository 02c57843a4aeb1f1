//! Mean-reversion alpha: fades an extended N-day return.
//!
//! The N-day return is z-scored against its own trailing N-day mean and std;
//! score = clip(−z / z_threshold). An oversold name scores positive.

use super::clip_unit;
use crate::domain::Bar;
use crate::indicators::{zscore, Indicator, PeriodReturn};

pub fn mean_reversion_alpha(bars: &[Bar], lookback: usize, z_threshold: f64) -> Vec<f64> {
    let returns = PeriodReturn::new(lookback).compute(bars);
    zscore(&returns, lookback)
        .into_iter()
        .map(|z| clip_unit(-z / z_threshold))
        .collect()
}
