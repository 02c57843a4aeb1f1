//! Backtest engine: applies dated target weights to next-row forward returns.
//!
//! Shift discipline:
//! - a weight decided on date t earns close(t+1)/close(t) − 1, where t+1 is
//!   the instrument's next position row;
//! - that P&L is realized on t+1 (the effective date), never on t;
//! - exposures stay on t.
//!
//! The portfolio series is keyed by exposure dates. The trade ledger keeps
//! origin dates.

pub mod ledger;
pub mod portfolio;

pub use ledger::build_trades;
pub use portfolio::aggregate;

use crate::domain::{Bar, PortfolioDay, Position, RegimeRecord, Trade};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Portfolio series and trade ledger of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BacktestOutput {
    pub portfolio: Vec<PortfolioDay>,
    pub trades: Vec<Trade>,
}

/// Run the backtest.
///
/// Positions without a matching price still count toward exposure but earn
/// nothing. Output is ordered by date, then instrument.
pub fn run(prices: &[Bar], positions: &[Position], strategy_name: &str) -> BacktestOutput {
    let trades = build_trades(prices, positions, strategy_name);
    let portfolio = aggregate(positions, &trades, strategy_name);
    tracing::debug!(
        strategy = strategy_name,
        days = portfolio.len(),
        trades = trades.len(),
        "backtest complete"
    );
    BacktestOutput { portfolio, trades }
}

impl BacktestOutput {
    /// Stamp the benchmark regime onto portfolio days (by date) and trades
    /// (by origin date). Dates without a regime stay unlabelled.
    pub fn attach_regimes(&mut self, regimes: &[RegimeRecord]) {
        let by_date: HashMap<NaiveDate, _> =
            regimes.iter().map(|r| (r.date, r.regime_label)).collect();
        for day in &mut self.portfolio {
            day.regime_label = by_date.get(&day.date).copied();
        }
        for trade in &mut self.trades {
            trade.regime_label = by_date.get(&trade.date).copied();
        }
    }
}
