//! Trailing N-day simple return of close.
//!
//! value[t] = close[t] / close[t-period] - 1. Lookback: period.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct PeriodReturn {
    period: usize,
    name: String,
}

impl PeriodReturn {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "return period must be >= 1");
        Self {
            period,
            name: format!("ret_{period}d"),
        }
    }
}

impl Indicator for PeriodReturn {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        for i in self.period..n {
            let prev = bars[i - self.period].close;
            let curr = bars[i].close;
            if prev.is_nan() || curr.is_nan() || prev == 0.0 {
                continue;
            }
            result[i] = curr / prev - 1.0;
        }
        result
    }
}
