//! Drawdown of close from its running maximum.
//!
//! Defined from the first bar onward (lookback 0). The first defined value
//! is always 0.0.

use super::Indicator;
use crate::domain::{closes, Bar};
use crate::risk;

#[derive(Debug, Clone, Default)]
pub struct Drawdown;

impl Drawdown {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for Drawdown {
    fn name(&self) -> &str {
        "drawdown"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        risk::drawdown(&closes(bars))
    }
}
