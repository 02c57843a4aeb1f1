//! Backtest summary over the realized portfolio return series.

use crate::metrics;
use chrono::NaiveDate;
use hybridalpha_core::domain::{PortfolioDay, Trade};
use hybridalpha_core::risk;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub strategy_name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sharpe: f64,
    pub sortino: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub num_trades: usize,
    /// Days with attributed P&L.
    pub realized_days: usize,
    pub total_return: f64,
    pub cagr: f64,
    /// Summed daily return per regime label, over labelled realized days.
    pub pnl_by_regime: BTreeMap<String, f64>,
}

/// Summarize a backtest. Only realized days enter the return series.
pub fn summarize(
    portfolio: &[PortfolioDay],
    trades: &[Trade],
    strategy_name: &str,
    risk_free_rate: f64,
) -> BacktestSummary {
    let realized: Vec<&PortfolioDay> = portfolio.iter().filter(|d| d.realized).collect();
    let raw: Vec<f64> = realized.iter().map(|d| d.daily_return).collect();
    let returns = metrics::clean_returns(&raw);
    let cumulative = risk::cumulative_growth(&returns);

    let mut pnl_by_regime = BTreeMap::new();
    for (day, r) in realized.iter().zip(&returns) {
        if let Some(label) = day.regime_label {
            *pnl_by_regime.entry(label.to_string()).or_insert(0.0) += r;
        }
    }

    BacktestSummary {
        strategy_name: strategy_name.to_string(),
        start_date: portfolio.first().map(|d| d.date),
        end_date: portfolio.last().map(|d| d.date),
        sharpe: metrics::sharpe_ratio(&returns, risk_free_rate),
        sortino: metrics::sortino_ratio(&returns, risk_free_rate),
        max_drawdown: metrics::max_drawdown(&cumulative),
        win_rate: metrics::win_rate(&returns),
        num_trades: trades.len(),
        realized_days: returns.len(),
        total_return: metrics::total_return(&returns),
        cagr: metrics::cagr(&returns),
        pnl_by_regime,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hybridalpha_core::backtest;
    use hybridalpha_core::domain::{Bar, Position, RegimeLabel, RegimeRecord};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            date: date(day),
            instrument: "AAA".into(),
            open: close,
            high: close,
            low: close,
            close,
            adjusted_close: close,
            volume: 0,
        }
    }

    fn position(day: u32, weight: f64) -> Position {
        Position {
            date: date(day),
            instrument: "AAA".into(),
            strategy_name: "s".into(),
            target_weight: weight,
            realized_vol_lookback: Some(0.15),
            max_weight_applied: false,
        }
    }

    #[test]
    fn three_date_scenario() {
        let prices = vec![bar(2, 100.0), bar(3, 101.0), bar(4, 103.0)];
        let positions = vec![position(2, 1.0), position(3, 1.0), position(4, 1.0)];
        let mut out = backtest::run(&prices, &positions, "s");
        out.attach_regimes(&[
            RegimeRecord::one_hot(date(3), "SPY", RegimeLabel::Bull),
            RegimeRecord::one_hot(date(4), "SPY", RegimeLabel::Choppy),
        ]);

        let s = summarize(&out.portfolio, &out.trades, "s", 0.0);
        let r2 = 103.0 / 101.0 - 1.0;
        assert_eq!(s.realized_days, 2);
        assert_eq!(s.num_trades, 2);
        assert_eq!(s.start_date, Some(date(2)));
        assert_eq!(s.end_date, Some(date(4)));
        assert!((s.sharpe - metrics::sharpe_ratio(&[0.01, r2], 0.0)).abs() < 1e-12);
        assert!(s.sharpe > 0.0);
        assert!(s.max_drawdown <= 0.0);
        assert_eq!(s.win_rate, 1.0);
        assert!((s.total_return - (1.01 * (1.0 + r2) - 1.0)).abs() < 1e-12);
        assert!((s.pnl_by_regime["bull"] - 0.01).abs() < 1e-12);
        assert!((s.pnl_by_regime["choppy"] - r2).abs() < 1e-12);
    }

    #[test]
    fn empty_portfolio_is_all_zero() {
        let s = summarize(&[], &[], "s", 0.02);
        assert_eq!(s.sharpe, 0.0);
        assert_eq!(s.sortino, 0.0);
        assert_eq!(s.max_drawdown, 0.0);
        assert_eq!(s.win_rate, 0.0);
        assert_eq!(s.cagr, 0.0);
        assert!(s.pnl_by_regime.is_empty());
        assert_eq!(s.start_date, None);
    }

    #[test]
    fn unlabelled_days_are_left_out_of_regime_pnl() {
        let prices = vec![bar(2, 100.0), bar(3, 110.0)];
        let positions = vec![position(2, 0.5), position(3, 0.5)];
        let out = backtest::run(&prices, &positions, "s");
        let s = summarize(&out.portfolio, &out.trades, "s", 0.0);
        assert!(s.pnl_by_regime.is_empty());
        assert!((s.total_return - 0.05).abs() < 1e-12);
    }
}
