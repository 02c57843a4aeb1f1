//! Relative-strength alpha: N-day return in excess of the benchmark's.
//!
//! score = clip((ret_N(instrument) − ret_N(benchmark)) / scale), with the
//! benchmark return joined by date.

use super::clip_unit;
use crate::domain::Bar;
use crate::indicators::{Indicator, PeriodReturn};
use chrono::NaiveDate;
use std::collections::HashMap;

pub fn relative_strength_alpha(
    bars: &[Bar],
    benchmark: &[Bar],
    lookback: usize,
    scale: f64,
) -> Vec<f64> {
    let ret = PeriodReturn::new(lookback);
    let bench_by_date: HashMap<NaiveDate, f64> = benchmark
        .iter()
        .map(|b| b.date)
        .zip(ret.compute(benchmark))
        .collect();

    bars.iter()
        .zip(ret.compute(bars))
        .map(|(bar, r)| match bench_by_date.get(&bar.date) {
            Some(bench) => clip_unit((r - bench) / scale),
            None => f64::NAN,
        })
        .collect()
}
