//! Regime-conditioned weight table with an explicit fallback chain.

use crate::domain::{Contributions, RegimeLabel};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Weights applied to each signal source under one regime.
///
/// Missing fields deserialize to 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalWeights {
    pub trend_alpha: f64,
    pub mean_reversion_alpha: f64,
    pub vol_alpha: f64,
    pub rel_strength_alpha: f64,
    pub ml: f64,
}

impl SignalWeights {
    pub const ZERO: SignalWeights = SignalWeights {
        trend_alpha: 0.0,
        mean_reversion_alpha: 0.0,
        vol_alpha: 0.0,
        rel_strength_alpha: 0.0,
        ml: 0.0,
    };

    /// Multiply each signal by its weight. Absent or NaN signals contribute 0.
    pub fn apply(
        &self,
        trend: Option<f64>,
        mean_reversion: Option<f64>,
        vol: Option<f64>,
        rel_strength: Option<f64>,
        ml: f64,
    ) -> Contributions {
        let v = |x: Option<f64>| x.filter(|x| !x.is_nan()).unwrap_or(0.0);
        Contributions {
            trend: v(trend) * self.trend_alpha,
            mean_reversion: v(mean_reversion) * self.mean_reversion_alpha,
            vol: v(vol) * self.vol_alpha,
            rel_strength: v(rel_strength) * self.rel_strength_alpha,
            ml: v(Some(ml)) * self.ml,
        }
    }

    fn is_finite(&self) -> bool {
        [
            self.trend_alpha,
            self.mean_reversion_alpha,
            self.vol_alpha,
            self.rel_strength_alpha,
            self.ml,
        ]
        .iter()
        .all(|w| w.is_finite())
    }
}

/// Outcome of a weight lookup, recording which tier answered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightLookup<'a> {
    /// The table has an entry for the requested regime.
    Exact(&'a SignalWeights),
    /// No entry for the regime; the `choppy` entry was used.
    ChoppyFallback(&'a SignalWeights),
    /// Neither the regime nor `choppy` is configured.
    Zero,
}

impl WeightLookup<'_> {
    pub fn weights(&self) -> SignalWeights {
        match self {
            WeightLookup::Exact(w) | WeightLookup::ChoppyFallback(w) => **w,
            WeightLookup::Zero => SignalWeights::ZERO,
        }
    }
}

/// Map from regime label to signal weights.
///
/// Serialized as a map keyed by the lowercase label (`bull`, `bear`, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, SignalWeights>",
    into = "BTreeMap<String, SignalWeights>"
)]
pub struct RegimeWeightTable(pub BTreeMap<RegimeLabel, SignalWeights>);

impl TryFrom<BTreeMap<String, SignalWeights>> for RegimeWeightTable {
    type Error = String;

    fn try_from(raw: BTreeMap<String, SignalWeights>) -> Result<Self, Self::Error> {
        raw.into_iter()
            .map(|(k, w)| Ok((k.parse::<RegimeLabel>()?, w)))
            .collect::<Result<BTreeMap<_, _>, String>>()
            .map(RegimeWeightTable)
    }
}

impl From<RegimeWeightTable> for BTreeMap<String, SignalWeights> {
    fn from(table: RegimeWeightTable) -> Self {
        table
            .0
            .into_iter()
            .map(|(label, w)| (label.as_str().to_string(), w))
            .collect()
    }
}

impl RegimeWeightTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, label: RegimeLabel, weights: SignalWeights) -> Self {
        self.0.insert(label, weights);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn lookup(&self, regime: RegimeLabel) -> WeightLookup<'_> {
        if let Some(w) = self.0.get(&regime) {
            return WeightLookup::Exact(w);
        }
        match self.0.get(&RegimeLabel::Choppy) {
            Some(w) => WeightLookup::ChoppyFallback(w),
            None => WeightLookup::Zero,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.is_empty() {
            return Err(ConfigError::MissingWeightTable);
        }
        for (label, w) in &self.0 {
            if !w.is_finite() {
                return Err(ConfigError::invalid(
                    format!("weights.{label}"),
                    "weights must be finite",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(trend: f64) -> SignalWeights {
        SignalWeights {
            trend_alpha: trend,
            ..SignalWeights::default()
        }
    }

    #[test]
    fn exact_then_choppy_then_zero() {
        let table = RegimeWeightTable::new()
            .with(RegimeLabel::Bull, w(0.5))
            .with(RegimeLabel::Choppy, w(0.2));
        assert_eq!(table.lookup(RegimeLabel::Bull), WeightLookup::Exact(&w(0.5)));
        assert_eq!(
            table.lookup(RegimeLabel::Crash),
            WeightLookup::ChoppyFallback(&w(0.2))
        );

        let no_choppy = RegimeWeightTable::new().with(RegimeLabel::Bull, w(0.5));
        assert_eq!(no_choppy.lookup(RegimeLabel::Bear), WeightLookup::Zero);
        assert_eq!(no_choppy.lookup(RegimeLabel::Bear).weights(), SignalWeights::ZERO);
    }

    #[test]
    fn empty_table_is_a_config_error() {
        assert_eq!(
            RegimeWeightTable::new().validate(),
            Err(ConfigError::MissingWeightTable)
        );
    }

    #[test]
    fn absent_signals_contribute_nothing() {
        let weights = SignalWeights {
            trend_alpha: 1.0,
            mean_reversion_alpha: 1.0,
            vol_alpha: 1.0,
            rel_strength_alpha: 1.0,
            ml: 1.0,
        };
        let c = weights.apply(None, Some(f64::NAN), Some(0.2), None, 0.1);
        assert_eq!(c.trend, 0.0);
        assert_eq!(c.mean_reversion, 0.0);
        assert_eq!(c.vol, 0.2);
        assert_eq!(c.ml, 0.1);
    }

    #[test]
    fn missing_weight_fields_default_to_zero() {
        let parsed: SignalWeights = serde_json::from_str(r#"{"trend_alpha": 0.4}"#).unwrap();
        assert_eq!(parsed.trend_alpha, 0.4);
        assert_eq!(parsed.ml, 0.0);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let parsed: Result<RegimeWeightTable, _> =
            serde_json::from_str(r#"{"sideways": {"ml": 0.3}}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn table_deserializes_from_label_keys() {
        let table: RegimeWeightTable =
            serde_json::from_str(r#"{"bull": {"trend_alpha": 0.5}, "crash": {"ml": 0.3}}"#)
                .unwrap();
        assert_eq!(table.lookup(RegimeLabel::Bull).weights().trend_alpha, 0.5);
        assert_eq!(table.lookup(RegimeLabel::Crash).weights().ml, 0.3);
    }
}
