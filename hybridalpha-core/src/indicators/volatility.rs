//! Realized volatility and its z-score.
//!
//! `RealizedVol`: rolling sample std of one-day close returns × √252.
//! Lookback: `window` (one bar is consumed by the first return).
//!
//! `VolZScore`: (vol - rolling mean of vol) / rolling std of vol, where both
//! rolling statistics use the same window as the volatility itself.
//! Lookback: 2 × window - 1.

use super::Indicator;
use crate::domain::{closes, Bar};
use crate::risk;

#[derive(Debug, Clone)]
pub struct RealizedVol {
    window: usize,
    name: String,
}

impl RealizedVol {
    pub fn new(window: usize) -> Self {
        assert!(window >= 2, "realized vol window must be >= 2");
        Self {
            window,
            name: format!("realized_vol_{window}"),
        }
    }
}

impl Indicator for RealizedVol {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        risk::realized_vol_from_closes(&closes(bars), self.window)
    }
}

#[derive(Debug, Clone)]
pub struct VolZScore {
    window: usize,
    name: String,
}

impl VolZScore {
    pub fn new(window: usize) -> Self {
        assert!(window >= 2, "vol z-score window must be >= 2");
        Self {
            window,
            name: format!("vol_z_{window}"),
        }
    }
}

impl Indicator for VolZScore {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        2 * self.window - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let vol = risk::realized_vol_from_closes(&closes(bars), self.window);
        zscore(&vol, self.window)
    }
}

/// Rolling z-score of a series against its own trailing mean and std.
///
/// Division follows IEEE semantics: a zero trailing std yields ±inf (or NaN
/// for 0/0), which callers treat as "not below threshold" or "undefined".
pub fn zscore(values: &[f64], window: usize) -> Vec<f64> {
    let mean = risk::rolling_mean(values, window);
    let std = risk::rolling_std(values, window);
    values
        .iter()
        .zip(mean.iter().zip(std.iter()))
        .map(|(v, (m, s))| (v - m) / s)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn realized_vol_warmup() {
        let bars = make_bars(&[100.0, 101.0, 100.0, 102.0, 101.0]);
        let vol = RealizedVol::new(3).compute(&bars);
        assert!(vol[..3].iter().all(|v| v.is_nan()));
        assert!(vol[3] > 0.0);
        assert!(vol[4] > 0.0);
    }

    #[test]
    fn realized_vol_constant_growth_is_zero() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 * 2.0_f64.powi(i)).collect();
        let vol = RealizedVol::new(3).compute(&make_bars(&closes));
        assert_eq!(vol[9], 0.0);
    }

    #[test]
    fn zscore_of_known_window() {
        let z = zscore(&[1.0, 2.0, 3.0], 3);
        // mean 2, sample std 1 → z = 1
        assert_approx(z[2], 1.0, DEFAULT_EPSILON);
        assert!(z[1].is_nan());
    }

    #[test]
    fn vol_zscore_lookback() {
        let ind = VolZScore::new(20);
        assert_eq!(ind.lookback(), 39);
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + ((i * 7) % 5) as f64).collect();
        let z = ind.compute(&make_bars(&closes));
        assert!(z[38].is_nan());
        assert!(!z[40].is_nan());
    }
}
