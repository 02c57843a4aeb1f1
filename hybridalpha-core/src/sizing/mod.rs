//! Position sizing: alpha score + trailing realized volatility → capped
//! portfolio weight.
//!
//! Sizers are regime-agnostic and see one (date, instrument) at a time. They
//! never normalise across instruments; each weight is capped independently.

mod vol_target;

pub use vol_target::{SizingParams, VolTargetSizer};

use crate::domain::{AlphaScoreRow, Bar, Position};
use crate::risk;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Default strategy name stamped on positions.
pub const DEFAULT_STRATEGY_NAME: &str = "hybrid_alpha_mvp";

/// Weight decided for one (date, instrument).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizedWeight {
    pub target_weight: f64,
    pub max_weight_applied: bool,
}

/// Converts an alpha score into a portfolio weight.
pub trait WeightSizer: Send + Sync {
    fn name(&self) -> &str;

    /// `realized_vol` is `None` when the trailing volatility is undefined
    /// or zero. The returned weight is always finite.
    fn weight(&self, alpha_score: f64, realized_vol: Option<f64>) -> SizedWeight;
}

/// Trailing annualised realized volatility per (instrument, date).
#[derive(Debug, Clone, Default)]
pub struct RealizedVolTable {
    by_instrument: HashMap<String, HashMap<NaiveDate, f64>>,
}

impl RealizedVolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute and insert the vol series of one instrument's bars
    /// (ascending dates, single instrument).
    pub fn insert_bars(&mut self, bars: &[Bar], vol_window: usize) {
        let Some(first) = bars.first() else {
            return;
        };
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let vol = risk::realized_vol_from_closes(&closes, vol_window);
        let series = bars.iter().map(|b| b.date).zip(vol).collect();
        self.by_instrument.insert(first.instrument.clone(), series);
    }

    pub fn from_bars<'a>(
        series: impl IntoIterator<Item = &'a [Bar]>,
        vol_window: usize,
    ) -> Self {
        let mut table = Self::new();
        for bars in series {
            table.insert_bars(bars, vol_window);
        }
        table
    }

    /// Realized vol, `None` when missing, NaN, or zero.
    pub fn get(&self, instrument: &str, date: NaiveDate) -> Option<f64> {
        self.by_instrument
            .get(instrument)
            .and_then(|s| s.get(&date))
            .copied()
            .filter(|v| v.is_finite() && *v != 0.0)
    }
}

/// Size every alpha score, in input order.
pub fn size_with(
    sizer: &dyn WeightSizer,
    alpha_scores: &[AlphaScoreRow],
    vols: &RealizedVolTable,
    strategy_name: &str,
) -> Vec<Position> {
    alpha_scores
        .iter()
        .map(|row| {
            let vol = vols.get(&row.instrument, row.date);
            let sized = sizer.weight(row.alpha_score, vol);
            Position {
                date: row.date,
                instrument: row.instrument.clone(),
                strategy_name: strategy_name.to_string(),
                target_weight: sized.target_weight,
                realized_vol_lookback: vol,
                max_weight_applied: sized.max_weight_applied,
            }
        })
        .collect()
}

/// Size with a volatility-targeting sizer built from `target_vol` and `max_weight`.
pub fn size(
    alpha_scores: &[AlphaScoreRow],
    vols: &RealizedVolTable,
    target_vol: f64,
    max_weight: f64,
    strategy_name: &str,
) -> Vec<Position> {
    let sizer = VolTargetSizer::new(target_vol, max_weight);
    size_with(&sizer, alpha_scores, vols, strategy_name)
}
