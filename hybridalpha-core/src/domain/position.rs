use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Target portfolio weight for one instrument on one date.
///
/// The sole artifact consumed by the backtest engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub date: NaiveDate,
    pub instrument: String,
    pub strategy_name: String,
    pub target_weight: f64,
    pub realized_vol_lookback: Option<f64>,
    pub max_weight_applied: bool,
}
