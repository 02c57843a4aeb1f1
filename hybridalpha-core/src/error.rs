//! Configuration errors raised by the engine.
//!
//! Missing optional data and degenerate numerics are absorbed inside each
//! stage. Only problems that make a run meaningless surface here.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("benchmark '{0}' has no bars")]
    MissingBenchmark(String),

    #[error("table '{table}' is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("regime weight table is missing or empty")]
    MissingWeightTable,

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("regime input mixes instruments '{first}' and '{other}'")]
    MixedInstruments { first: String, other: String },
}

impl ConfigError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
