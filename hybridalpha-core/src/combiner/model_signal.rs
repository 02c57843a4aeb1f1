//! Directional signal derived from the external classifier's state probabilities.

use crate::domain::ModelPrediction;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Model signal keyed by (date, instrument) for a single horizon.
#[derive(Debug, Clone, Default)]
pub struct ModelSignalTable {
    horizon: u32,
    values: HashMap<NaiveDate, HashMap<String, f64>>,
}

impl ModelSignalTable {
    /// Build from predictions, keeping only rows at `horizon`.
    ///
    /// When several rows share a key the last one wins.
    pub fn build(predictions: &[ModelPrediction], horizon: u32) -> Self {
        let mut values: HashMap<NaiveDate, HashMap<String, f64>> = HashMap::new();
        for p in predictions.iter().filter(|p| p.horizon == horizon) {
            values
                .entry(p.date)
                .or_default()
                .insert(p.instrument.clone(), p.probabilities.net_direction());
        }
        if values.is_empty() {
            tracing::debug!(horizon, "no model predictions at horizon; model signal is zero");
        }
        Self { horizon, values }
    }

    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    pub fn len(&self) -> usize {
        self.values.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Signal for (date, instrument); 0.0 when the model has no row.
    pub fn get(&self, date: NaiveDate, instrument: &str) -> f64 {
        self.values
            .get(&date)
            .and_then(|by_instrument| by_instrument.get(instrument))
            .copied()
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StateProbabilities;

    fn pred(day: u32, horizon: u32, probs: [f64; 7]) -> ModelPrediction {
        ModelPrediction {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            instrument: "AAPL".into(),
            horizon,
            probabilities: StateProbabilities(probs),
        }
    }

    #[test]
    fn filters_to_requested_horizon() {
        let preds = vec![
            pred(2, 1, [0.0, 0.0, 0.0, 0.0, 0.5, 0.3, 0.2]),
            pred(2, 5, [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
        ];
        let table = ModelSignalTable::build(&preds, 1);
        assert_eq!(table.len(), 1);
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!((table.get(d, "AAPL") - 1.0).abs() < 1e-12);
    }

    #[test]
    fn missing_horizon_is_zero_everywhere() {
        let preds = vec![pred(2, 5, [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0])];
        let table = ModelSignalTable::build(&preds, 1);
        assert!(table.is_empty());
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(table.get(d, "AAPL"), 0.0);
    }

    #[test]
    fn net_mass_ignores_neutral_state() {
        let preds = vec![pred(3, 1, [0.1, 0.1, 0.1, 0.4, 0.1, 0.1, 0.1])];
        let table = ModelSignalTable::build(&preds, 1);
        let d = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert!(table.get(d, "AAPL").abs() < 1e-12);
    }
}
