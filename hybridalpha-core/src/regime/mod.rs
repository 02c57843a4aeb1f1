//! Market regime classification over a benchmark bar series.
//!
//! The rule-based model labels each date from trend (SMA), volatility
//! z-score, and drawdown. Every rule reads only data at or before the date
//! being labelled.

mod rules;

pub use rules::{RegimeParams, RuleBasedRegime};

use crate::domain::{Bar, RegimeRecord};
use crate::error::ConfigError;

/// A model that assigns a regime to every date of a benchmark series.
///
/// Output has the same length and order as the input bars. Implementations
/// may emit soft probabilities in the `regime_prob_*` fields; the label must
/// be the most probable regime.
pub trait RegimeModel: Send + Sync {
    fn name(&self) -> &str;

    fn classify(&self, bars: &[Bar]) -> Result<Vec<RegimeRecord>, ConfigError>;
}

/// Classify a benchmark series with the rule-based model.
pub fn classify(bars: &[Bar], params: &RegimeParams) -> Result<Vec<RegimeRecord>, ConfigError> {
    RuleBasedRegime::new(params.clone())?.classify(bars)
}
