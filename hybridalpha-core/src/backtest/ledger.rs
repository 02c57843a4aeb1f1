//! Trade ledger: one row per position with a defined forward return.

use crate::domain::{Bar, Position, Trade};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Build trades from positions joined to closes by (date, instrument).
///
/// For each instrument the positions are walked in date order; a position's
/// forward return uses the close on the instrument's next position date.
/// Rows whose own or next close is missing produce no trade.
pub fn build_trades(prices: &[Bar], positions: &[Position], strategy_name: &str) -> Vec<Trade> {
    let closes: HashMap<(&str, NaiveDate), f64> = prices
        .iter()
        .map(|b| ((b.instrument.as_str(), b.date), b.close))
        .collect();

    let mut by_instrument: BTreeMap<&str, Vec<&Position>> = BTreeMap::new();
    for p in positions {
        by_instrument.entry(p.instrument.as_str()).or_default().push(p);
    }

    let mut unpriced = 0usize;
    let mut trades = Vec::new();
    for (instrument, mut rows) in by_instrument {
        rows.sort_by_key(|p| p.date);
        for pair in rows.windows(2) {
            let (held, next) = (pair[0], pair[1]);
            let close = closes.get(&(instrument, held.date));
            let next_close = closes.get(&(instrument, next.date));
            let forward_return = match (close, next_close) {
                (Some(c0), Some(c1)) => c1 / c0 - 1.0,
                _ => {
                    unpriced += 1;
                    continue;
                }
            };
            if !forward_return.is_finite() {
                unpriced += 1;
                continue;
            }
            trades.push(Trade {
                date: held.date,
                instrument: instrument.to_string(),
                strategy_name: strategy_name.to_string(),
                target_weight: held.target_weight,
                forward_return,
                pnl: held.target_weight * forward_return,
                effective_date: next.date,
                regime_label: None,
            });
        }
    }

    if unpriced > 0 {
        tracing::debug!(rows = unpriced, "positions without a usable forward return skipped");
    }
    trades.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.instrument.cmp(&b.instrument)));
    trades
}
