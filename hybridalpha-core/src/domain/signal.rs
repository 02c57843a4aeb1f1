//! Signal-side records: raw alpha signals, model predictions, fused scores.

use super::regime::RegimeLabel;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Four independently computed alpha scores for one (date, instrument).
///
/// Each value lies in [-1, 1]. `None` (or NaN) means the signal is absent
/// on that row and contributes nothing downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlphaSignalRow {
    pub date: NaiveDate,
    #[serde(alias = "ticker")]
    pub instrument: String,
    pub trend_alpha: Option<f64>,
    pub mean_reversion_alpha: Option<f64>,
    pub vol_alpha: Option<f64>,
    pub rel_strength_alpha: Option<f64>,
}

/// Number of discrete model states: -3, -2, -1, 0, +1, +2, +3.
pub const NUM_STATES: usize = 7;

/// Probability simplex over the seven discrete return states.
///
/// Index `i` holds the probability of state `i - 3`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StateProbabilities(pub [f64; NUM_STATES]);

impl StateProbabilities {
    /// Probability of `state` (in -3..=3). Out-of-range states have zero mass.
    pub fn get(&self, state: i8) -> f64 {
        if !(-3..=3).contains(&state) {
            return 0.0;
        }
        self.0[(state + 3) as usize]
    }

    /// Total mass on states +1..=+3, NaN entries skipped.
    pub fn positive_mass(&self) -> f64 {
        self.0[4..].iter().filter(|p| !p.is_nan()).sum()
    }

    /// Total mass on states -3..=-1, NaN entries skipped.
    pub fn negative_mass(&self) -> f64 {
        self.0[..3].iter().filter(|p| !p.is_nan()).sum()
    }

    /// Net directional conviction: positive mass minus negative mass, clipped to [-1, 1].
    pub fn net_direction(&self) -> f64 {
        (self.positive_mass() - self.negative_mass()).clamp(-1.0, 1.0)
    }
}

/// External classifier output for one (date, instrument, horizon).
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPrediction {
    pub date: NaiveDate,
    pub instrument: String,
    pub horizon: u32,
    pub probabilities: StateProbabilities,
}

/// Flat tabular form of a [`ModelPrediction`], one column per state.
///
/// Missing columns or empty cells read as `None` and count as zero mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    pub date: NaiveDate,
    #[serde(alias = "ticker")]
    pub instrument: String,
    pub horizon: u32,
    #[serde(default)]
    pub prob_state_m3: Option<f64>,
    #[serde(default)]
    pub prob_state_m2: Option<f64>,
    #[serde(default)]
    pub prob_state_m1: Option<f64>,
    #[serde(default)]
    pub prob_state_0: Option<f64>,
    #[serde(default)]
    pub prob_state_p1: Option<f64>,
    #[serde(default)]
    pub prob_state_p2: Option<f64>,
    #[serde(default)]
    pub prob_state_p3: Option<f64>,
}

impl From<PredictionRow> for ModelPrediction {
    fn from(row: PredictionRow) -> Self {
        let cells = [
            row.prob_state_m3,
            row.prob_state_m2,
            row.prob_state_m1,
            row.prob_state_0,
            row.prob_state_p1,
            row.prob_state_p2,
            row.prob_state_p3,
        ];
        let mut probs = [0.0; NUM_STATES];
        for (slot, cell) in probs.iter_mut().zip(cells) {
            *slot = cell.unwrap_or(0.0);
        }
        ModelPrediction {
            date: row.date,
            instrument: row.instrument,
            horizon: row.horizon,
            probabilities: StateProbabilities(probs),
        }
    }
}

impl From<&ModelPrediction> for PredictionRow {
    fn from(pred: &ModelPrediction) -> Self {
        let p = pred.probabilities.0;
        PredictionRow {
            date: pred.date,
            instrument: pred.instrument.clone(),
            horizon: pred.horizon,
            prob_state_m3: Some(p[0]),
            prob_state_m2: Some(p[1]),
            prob_state_m1: Some(p[2]),
            prob_state_0: Some(p[3]),
            prob_state_p1: Some(p[4]),
            prob_state_p2: Some(p[5]),
            prob_state_p3: Some(p[6]),
        }
    }
}

/// Per-source attribution of an alpha score (signal value times regime weight).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Contributions {
    pub trend: f64,
    pub mean_reversion: f64,
    pub vol: f64,
    pub rel_strength: f64,
    pub ml: f64,
}

impl Contributions {
    pub fn sum(&self) -> f64 {
        self.trend + self.mean_reversion + self.vol + self.rel_strength + self.ml
    }
}

/// Fused alpha score for one (date, instrument).
///
/// The `contrib_*` columns are computed before the final clip, so they sum
/// to `alpha_score` only when the unclipped total lies within [-1, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlphaScoreRow {
    pub date: NaiveDate,
    pub instrument: String,
    pub alpha_score: f64,
    pub alpha_confidence: f64,
    pub contrib_trend: f64,
    pub contrib_mean_rev: f64,
    pub contrib_vol: f64,
    pub contrib_rel_strength: f64,
    pub contrib_ml: f64,
    pub regime_label: RegimeLabel,
}

impl AlphaScoreRow {
    pub fn contributions(&self) -> Contributions {
        Contributions {
            trend: self.contrib_trend,
            mean_reversion: self.contrib_mean_rev,
            vol: self.contrib_vol,
            rel_strength: self.contrib_rel_strength,
            ml: self.contrib_ml,
        }
    }
}
