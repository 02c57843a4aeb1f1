//! Rule-based regime labels: crash, then insufficient history, then bull/bear.

use super::RegimeModel;
use crate::domain::{closes, Bar, RegimeLabel, RegimeRecord};
use crate::error::ConfigError;
use crate::indicators::{sma, Drawdown, Indicator, VolZScore};
use serde::{Deserialize, Serialize};

/// Thresholds and windows for the rule-based classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeParams {
    pub trend_ma_short: usize,
    pub trend_ma_long: usize,
    pub vol_lookback: usize,
    pub high_vol_zscore: f64,
    pub crash_drawdown_threshold: f64,
}

impl Default for RegimeParams {
    fn default() -> Self {
        Self {
            trend_ma_short: 50,
            trend_ma_long: 200,
            vol_lookback: 20,
            high_vol_zscore: 1.5,
            crash_drawdown_threshold: -0.2,
        }
    }
}

impl RegimeParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trend_ma_short == 0 {
            return Err(ConfigError::invalid("trend_ma_short", "must be >= 1"));
        }
        if self.trend_ma_long == 0 {
            return Err(ConfigError::invalid("trend_ma_long", "must be >= 1"));
        }
        if self.trend_ma_short > self.trend_ma_long {
            return Err(ConfigError::invalid(
                "trend_ma_short",
                format!(
                    "short window {} exceeds long window {}",
                    self.trend_ma_short, self.trend_ma_long
                ),
            ));
        }
        if self.vol_lookback < 2 {
            return Err(ConfigError::invalid("vol_lookback", "must be >= 2"));
        }
        if !self.high_vol_zscore.is_finite() {
            return Err(ConfigError::invalid("high_vol_zscore", "must be finite"));
        }
        if !(self.crash_drawdown_threshold < 0.0 && self.crash_drawdown_threshold >= -1.0) {
            return Err(ConfigError::invalid(
                "crash_drawdown_threshold",
                "must lie in [-1, 0)",
            ));
        }
        Ok(())
    }
}

/// Deterministic classifier producing one-hot regime records.
#[derive(Debug, Clone)]
pub struct RuleBasedRegime {
    params: RegimeParams,
}

impl RuleBasedRegime {
    pub fn new(params: RegimeParams) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &RegimeParams {
        &self.params
    }

    /// Label a single date from its precomputed inputs.
    fn label(&self, close: f64, ma_short: f64, ma_long: f64, vol_z: f64, dd: f64) -> RegimeLabel {
        if !dd.is_nan() && dd <= self.params.crash_drawdown_threshold {
            return RegimeLabel::Crash;
        }
        if close.is_nan() || ma_short.is_nan() || ma_long.is_nan() || vol_z.is_nan() {
            return RegimeLabel::Choppy;
        }
        let calm = vol_z <= self.params.high_vol_zscore;
        if close > ma_long && calm {
            RegimeLabel::Bull
        } else if close < ma_long && calm {
            RegimeLabel::Bear
        } else {
            RegimeLabel::Choppy
        }
    }
}

impl RegimeModel for RuleBasedRegime {
    fn name(&self) -> &str {
        "rule_based"
    }

    fn classify(&self, bars: &[Bar]) -> Result<Vec<RegimeRecord>, ConfigError> {
        let Some(first) = bars.first() else {
            return Ok(Vec::new());
        };
        if let Some(other) = bars.iter().find(|b| b.instrument != first.instrument) {
            return Err(ConfigError::MixedInstruments {
                first: first.instrument.clone(),
                other: other.instrument.clone(),
            });
        }

        let p = &self.params;
        let close = closes(bars);
        let ma_short = sma(&close, p.trend_ma_short);
        let ma_long = sma(&close, p.trend_ma_long);
        let vol_z = VolZScore::new(p.vol_lookback).compute(bars);
        let dd = Drawdown::new().compute(bars);

        let records = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| {
                let label = self.label(close[i], ma_short[i], ma_long[i], vol_z[i], dd[i]);
                RegimeRecord::one_hot(bar.date, &bar.instrument, label)
            })
            .collect();
        Ok(records)
    }
}
