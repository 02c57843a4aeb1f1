//! Volatility-context alpha: prefers calm markets.
//!
//! Realized vol over `vol_window` is z-scored against its trailing
//! `zscore_lookback` mean and std; score = clip(−z / z_threshold).

use super::clip_unit;
use crate::domain::Bar;
use crate::indicators::{zscore, Indicator, RealizedVol};

pub fn volatility_alpha(
    bars: &[Bar],
    vol_window: usize,
    zscore_lookback: usize,
    z_threshold: f64,
) -> Vec<f64> {
    let vol = RealizedVol::new(vol_window).compute(bars);
    zscore(&vol, zscore_lookback)
        .into_iter()
        .map(|z| clip_unit(-z / z_threshold))
        .collect()
}
