//! Indicators: pure functions from a bar history to a numeric series.
//!
//! Every indicator returns a series the same length as its input, with
//! `f64::NAN` for the first `lookback()` values. No value at bar t may depend
//! on bars after t; `tests/lookahead_test.rs` checks this on truncated input.

pub mod drawdown;
pub mod returns;
pub mod sma;
pub mod volatility;

pub use drawdown::Drawdown;
pub use returns::PeriodReturn;
pub use sma::{sma, Sma};
pub use volatility::{zscore, RealizedVol, VolZScore};

use crate::domain::Bar;

/// A single-series indicator over a bar history.
pub trait Indicator: Send + Sync {
    /// Short name (e.g. "sma_50", "realized_vol_20").
    fn name(&self) -> &str;

    /// Number of leading bars that are always undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the whole bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Create synthetic bars from close prices for testing.
///
/// open = previous close (or close for the first bar), high/low pad by 1.0.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                instrument: "TEST".to_string(),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                adjusted_close: close,
                volume: 1000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
