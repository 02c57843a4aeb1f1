//! Backtest outputs: the daily portfolio series and the trade ledger.

use super::regime::RegimeLabel;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One calendar date of the aggregated portfolio.
///
/// Exposures describe what was held on `date`. `daily_return` is the P&L
/// realized on `date` from weights held on the previous date. When nothing
/// was attributed to `date` (first or last date, or a gap) the return is 0.0
/// and `realized` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioDay {
    pub date: NaiveDate,
    pub strategy_name: String,
    pub gross_exposure: f64,
    pub net_exposure: f64,
    pub daily_return: f64,
    pub realized: bool,
    pub cumulative_return: f64,
    #[serde(default)]
    pub regime_label: Option<RegimeLabel>,
}

/// Realized P&L of one held weight, keyed by its origin (holding) date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub date: NaiveDate,
    pub instrument: String,
    pub strategy_name: String,
    pub target_weight: f64,
    pub forward_return: f64,
    pub pnl: f64,
    /// Date the P&L is attributed to in the portfolio series.
    pub effective_date: NaiveDate,
    #[serde(default)]
    pub regime_label: Option<RegimeLabel>,
}
