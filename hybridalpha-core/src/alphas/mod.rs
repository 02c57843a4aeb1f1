//! Reference alpha builders: trend, mean reversion, volatility context,
//! and relative strength versus the benchmark.
//!
//! Each builder maps one instrument's bars to a score in [-1, 1] per date,
//! NaN where its inputs are not yet defined. `build_alpha_signals` assembles
//! the four into `AlphaSignalRow`s, turning NaN into an absent signal.

pub mod mean_reversion;
pub mod relative_strength;
pub mod trend;
pub mod volatility;

use crate::domain::{AlphaSignalRow, Bar};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Windows and scales of the four builders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphaParams {
    pub trend_fast: usize,
    pub trend_slow: usize,
    pub mean_reversion_lookback: usize,
    pub mean_reversion_z_threshold: f64,
    pub vol_window: usize,
    pub vol_zscore_lookback: usize,
    pub vol_z_threshold: f64,
    pub rel_strength_lookback: usize,
    pub rel_strength_scale: f64,
}

impl Default for AlphaParams {
    fn default() -> Self {
        Self {
            trend_fast: 20,
            trend_slow: 50,
            mean_reversion_lookback: 5,
            mean_reversion_z_threshold: 1.0,
            vol_window: 20,
            vol_zscore_lookback: 60,
            vol_z_threshold: 1.0,
            rel_strength_lookback: 20,
            rel_strength_scale: 0.1,
        }
    }
}

impl AlphaParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let windows = [
            ("trend_fast", self.trend_fast, 1),
            ("trend_slow", self.trend_slow, 1),
            ("mean_reversion_lookback", self.mean_reversion_lookback, 2),
            ("vol_window", self.vol_window, 2),
            ("vol_zscore_lookback", self.vol_zscore_lookback, 2),
            ("rel_strength_lookback", self.rel_strength_lookback, 1),
        ];
        for (name, value, min) in windows {
            if value < min {
                return Err(ConfigError::invalid(name, format!("must be >= {min}")));
            }
        }
        let scales = [
            ("mean_reversion_z_threshold", self.mean_reversion_z_threshold),
            ("vol_z_threshold", self.vol_z_threshold),
            ("rel_strength_scale", self.rel_strength_scale),
        ];
        for (name, value) in scales {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::invalid(name, "must be positive"));
            }
        }
        Ok(())
    }
}

/// Clip a raw score to [-1, 1]; NaN stays NaN.
pub(crate) fn clip_unit(x: f64) -> f64 {
    if x.is_nan() {
        x
    } else {
        x.clamp(-1.0, 1.0)
    }
}

fn defined(x: f64) -> Option<f64> {
    (!x.is_nan()).then_some(x)
}

/// Build the four alpha signals for one instrument.
///
/// `benchmark` is joined by date for the relative-strength builder; dates the
/// benchmark does not cover get no relative-strength signal.
pub fn build_alpha_signals(
    bars: &[Bar],
    benchmark: &[Bar],
    params: &AlphaParams,
) -> Vec<AlphaSignalRow> {
    let trend = trend::trend_alpha(bars, params.trend_fast, params.trend_slow);
    let mean_rev = mean_reversion::mean_reversion_alpha(
        bars,
        params.mean_reversion_lookback,
        params.mean_reversion_z_threshold,
    );
    let vol = volatility::volatility_alpha(
        bars,
        params.vol_window,
        params.vol_zscore_lookback,
        params.vol_z_threshold,
    );
    let rel = relative_strength::relative_strength_alpha(
        bars,
        benchmark,
        params.rel_strength_lookback,
        params.rel_strength_scale,
    );

    bars.iter()
        .enumerate()
        .map(|(i, bar)| AlphaSignalRow {
            date: bar.date,
            instrument: bar.instrument.clone(),
            trend_alpha: defined(trend[i]),
            mean_reversion_alpha: defined(mean_rev[i]),
            vol_alpha: defined(vol[i]),
            rel_strength_alpha: defined(rel[i]),
        })
        .collect()
}
