//! Signal combiner: fuses alpha signals and the model signal into one
//! bounded score per (date, instrument), weighted by the benchmark regime.

pub mod model_signal;
pub mod weights;

pub use model_signal::ModelSignalTable;
pub use weights::{RegimeWeightTable, SignalWeights, WeightLookup};

use crate::domain::{AlphaScoreRow, AlphaSignalRow, ModelPrediction, RegimeLabel, RegimeRecord};
use crate::error::ConfigError;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Default model horizon in days.
pub const DEFAULT_HORIZON: u32 = 1;

#[derive(Debug, Clone)]
pub struct SignalCombiner {
    weights: RegimeWeightTable,
    horizon: u32,
}

impl SignalCombiner {
    pub fn new(weights: RegimeWeightTable, horizon: u32) -> Result<Self, ConfigError> {
        weights.validate()?;
        Ok(Self { weights, horizon })
    }

    pub fn weights(&self) -> &RegimeWeightTable {
        &self.weights
    }

    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    /// One output row per signal row, in input order.
    ///
    /// Regimes are joined by date only; a date with no regime is treated as
    /// choppy. Contributions are kept pre-clip.
    pub fn combine(
        &self,
        signals: &[AlphaSignalRow],
        predictions: &[ModelPrediction],
        regimes: &[RegimeRecord],
    ) -> Vec<AlphaScoreRow> {
        let model = ModelSignalTable::build(predictions, self.horizon);
        let regime_by_date: HashMap<NaiveDate, RegimeLabel> =
            regimes.iter().map(|r| (r.date, r.regime_label)).collect();

        let mut missing_regime = 0usize;
        let rows: Vec<AlphaScoreRow> = signals
            .iter()
            .map(|s| {
                let regime = regime_by_date.get(&s.date).copied().unwrap_or_else(|| {
                    missing_regime += 1;
                    RegimeLabel::Choppy
                });
                let ml = model.get(s.date, &s.instrument);
                let c = self.weights.lookup(regime).weights().apply(
                    s.trend_alpha,
                    s.mean_reversion_alpha,
                    s.vol_alpha,
                    s.rel_strength_alpha,
                    ml,
                );
                let alpha_score = c.sum().clamp(-1.0, 1.0);
                AlphaScoreRow {
                    date: s.date,
                    instrument: s.instrument.clone(),
                    alpha_score,
                    alpha_confidence: alpha_score.abs(),
                    contrib_trend: c.trend,
                    contrib_mean_rev: c.mean_reversion,
                    contrib_vol: c.vol,
                    contrib_rel_strength: c.rel_strength,
                    contrib_ml: c.ml,
                    regime_label: regime,
                }
            })
            .collect();

        if missing_regime > 0 {
            tracing::debug!(rows = missing_regime, "signal dates without a regime defaulted to choppy");
        }
        rows
    }
}

/// Fuse signals with a fresh combiner. See [`SignalCombiner::combine`].
pub fn combine(
    signals: &[AlphaSignalRow],
    predictions: &[ModelPrediction],
    regimes: &[RegimeRecord],
    weights: &RegimeWeightTable,
    horizon: u32,
) -> Result<Vec<AlphaScoreRow>, ConfigError> {
    let combiner = SignalCombiner::new(weights.clone(), horizon)?;
    Ok(combiner.combine(signals, predictions, regimes))
}
