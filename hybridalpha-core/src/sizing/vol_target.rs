//! Volatility-targeting sizer.
//!
//! weight = clip(alpha × target_vol / realized_vol, ±max_weight)

use super::{SizedWeight, WeightSizer};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Risk budget for volatility targeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingParams {
    pub target_vol: f64,
    pub max_weight: f64,
    pub vol_window: usize,
}

impl Default for SizingParams {
    fn default() -> Self {
        Self {
            target_vol: 0.15,
            max_weight: 0.1,
            vol_window: 20,
        }
    }
}

impl SizingParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.target_vol.is_finite() && self.target_vol > 0.0) {
            return Err(ConfigError::invalid("target_vol", "must be positive"));
        }
        if !(self.max_weight.is_finite() && self.max_weight > 0.0) {
            return Err(ConfigError::invalid("max_weight", "must be positive"));
        }
        if self.vol_window < 2 {
            return Err(ConfigError::invalid("vol_window", "must be >= 2"));
        }
        Ok(())
    }

    pub fn sizer(&self) -> VolTargetSizer {
        VolTargetSizer::new(self.target_vol, self.max_weight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolTargetSizer {
    target_vol: f64,
    max_weight: f64,
}

impl VolTargetSizer {
    pub fn new(target_vol: f64, max_weight: f64) -> Self {
        Self {
            target_vol,
            max_weight,
        }
    }

    pub fn max_weight(&self) -> f64 {
        self.max_weight
    }

    /// Clamp a raw weight into [-max_weight, max_weight].
    pub fn cap(&self, raw: f64) -> f64 {
        raw.clamp(-self.max_weight, self.max_weight)
    }
}

impl WeightSizer for VolTargetSizer {
    fn name(&self) -> &str {
        "vol_target"
    }

    fn weight(&self, alpha_score: f64, realized_vol: Option<f64>) -> SizedWeight {
        let target_weight = match realized_vol {
            Some(vol) if vol > 0.0 && !alpha_score.is_nan() => {
                self.cap(alpha_score * self.target_vol / vol)
            }
            _ => 0.0,
        };
        SizedWeight {
            target_weight,
            max_weight_applied: target_weight.abs() >= self.max_weight,
        }
    }
}
