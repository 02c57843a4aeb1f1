//! Portfolio aggregation: exposures by position date, returns by effective date.

use crate::domain::{PortfolioDay, Position, Trade};
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub fn aggregate(positions: &[Position], trades: &[Trade], strategy_name: &str) -> Vec<PortfolioDay> {
    let mut exposures: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for p in positions {
        let entry = exposures.entry(p.date).or_insert((0.0, 0.0));
        entry.0 += p.target_weight.abs();
        entry.1 += p.target_weight;
    }

    let mut attributed: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for t in trades {
        *attributed.entry(t.effective_date).or_insert(0.0) += t.pnl;
    }

    let mut growth = 1.0;
    exposures
        .into_iter()
        .map(|(date, (gross, net))| {
            let realized = attributed.get(&date).copied();
            let daily_return = realized.unwrap_or(0.0);
            growth *= 1.0 + daily_return;
            PortfolioDay {
                date,
                strategy_name: strategy_name.to_string(),
                gross_exposure: gross,
                net_exposure: net,
                daily_return,
                realized: realized.is_some(),
                cumulative_return: growth,
                regime_label: None,
            }
        })
        .collect()
}
