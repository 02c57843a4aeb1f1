//! Performance metrics: pure functions over a daily return series.
//!
//! Degenerate inputs (empty, too short, zero dispersion) yield 0.0, never NaN.

use hybridalpha_core::risk::{self, ANNUALIZATION_DAYS};

/// Replace NaN returns with 0.0.
pub fn clean_returns(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .map(|r| if r.is_nan() { 0.0 } else { *r })
        .collect()
}

fn excess(returns: &[f64], risk_free_rate: f64) -> Vec<f64> {
    let daily_rf = risk_free_rate / ANNUALIZATION_DAYS;
    returns.iter().map(|r| r - daily_rf).collect()
}

/// √252 × mean / std, or 0.0 when the ratio is undefined.
fn annualized_ratio(mean: f64, std: f64) -> f64 {
    if !std.is_finite() || std == 0.0 {
        return 0.0;
    }
    ANNUALIZATION_DAYS.sqrt() * mean / std
}

/// Annualized Sharpe ratio of daily returns against an annual risk-free rate.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let ex = excess(returns, risk_free_rate);
    annualized_ratio(risk::mean(&ex), risk::sample_std(&ex))
}

/// Annualized Sortino ratio: mean excess over the std of negative excess returns.
///
/// 0.0 when fewer than two excess returns are negative.
pub fn sortino_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let ex = excess(returns, risk_free_rate);
    let downside: Vec<f64> = ex.iter().copied().filter(|r| *r < 0.0).collect();
    if downside.len() < 2 {
        return 0.0;
    }
    annualized_ratio(risk::mean(&ex), risk::sample_std(&downside))
}

/// Maximum drawdown of a cumulative growth series, as a non-positive fraction.
pub fn max_drawdown(cumulative: &[f64]) -> f64 {
    risk::max_drawdown(cumulative)
}

/// Fraction of returns strictly above zero.
pub fn win_rate(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    returns.iter().filter(|r| **r > 0.0).count() as f64 / returns.len() as f64
}

/// Compounded return over the whole series.
pub fn total_return(returns: &[f64]) -> f64 {
    risk::cumulative_growth(returns)
        .last()
        .map_or(0.0, |g| g - 1.0)
}

/// Compound annual growth rate, treating each return as one trading day.
pub fn cagr(returns: &[f64]) -> f64 {
    let Some(&growth) = risk::cumulative_growth(returns).last() else {
        return 0.0;
    };
    if growth <= 0.0 {
        return 0.0;
    }
    let years = returns.len() as f64 / ANNUALIZATION_DAYS;
    growth.powf(1.0 / years) - 1.0
}
