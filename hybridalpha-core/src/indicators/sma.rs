//! Simple moving average of close.
//!
//! Lookback: period - 1. A NaN close anywhere in the window leaves that
//! window undefined.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        sma(&closes, self.period)
    }
}

/// Running-sum SMA over an arbitrary series.
///
/// The running sum is rebuilt whenever a NaN enters or leaves the window so
/// a single bad value cannot contaminate later windows.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period {
        return out;
    }

    let mut sum: f64 = values[..period].iter().sum();
    let mut nan_in_window = values[..period].iter().any(|v| v.is_nan());
    if !nan_in_window {
        out[period - 1] = sum / period as f64;
    }

    for i in period..n {
        let leaving = values[i - period];
        let entering = values[i];
        if nan_in_window || leaving.is_nan() || entering.is_nan() {
            let window = &values[i + 1 - period..=i];
            nan_in_window = window.iter().any(|v| v.is_nan());
            sum = window.iter().sum();
        } else {
            sum += entering - leaving;
        }
        if !nan_in_window {
            out[i] = sum / period as f64;
        }
    }
    out
}
