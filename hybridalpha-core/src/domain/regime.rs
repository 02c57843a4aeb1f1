//! Market regime labels and the per-date regime record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discrete market condition assigned to a benchmark on one date.
///
/// The variant order doubles as the `regime_id` encoding
/// (bull = 0, bear = 1, choppy = 2, crash = 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegimeLabel {
    Bull,
    Bear,
    Choppy,
    Crash,
}

impl RegimeLabel {
    pub const ALL: [RegimeLabel; 4] = [
        RegimeLabel::Bull,
        RegimeLabel::Bear,
        RegimeLabel::Choppy,
        RegimeLabel::Crash,
    ];

    pub fn id(self) -> u8 {
        match self {
            RegimeLabel::Bull => 0,
            RegimeLabel::Bear => 1,
            RegimeLabel::Choppy => 2,
            RegimeLabel::Crash => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RegimeLabel::Bull => "bull",
            RegimeLabel::Bear => "bear",
            RegimeLabel::Choppy => "choppy",
            RegimeLabel::Crash => "crash",
        }
    }
}

impl fmt::Display for RegimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegimeLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bull" => Ok(RegimeLabel::Bull),
            "bear" => Ok(RegimeLabel::Bear),
            "choppy" => Ok(RegimeLabel::Choppy),
            "crash" => Ok(RegimeLabel::Crash),
            other => Err(format!("unknown regime label '{other}'")),
        }
    }
}

/// Regime classification for one benchmark date.
///
/// The probability fields are one-hot for the rule-based classifier. A soft
/// classifier can fill them with a distribution without changing the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeRecord {
    pub date: NaiveDate,
    pub benchmark: String,
    pub regime_label: RegimeLabel,
    pub regime_id: u8,
    pub regime_prob_bull: f64,
    pub regime_prob_bear: f64,
    pub regime_prob_choppy: f64,
    pub regime_prob_crash: f64,
}

impl RegimeRecord {
    /// Build a record whose probability fields are one-hot on `label`.
    pub fn one_hot(date: NaiveDate, benchmark: impl Into<String>, label: RegimeLabel) -> Self {
        let hot = |l: RegimeLabel| if l == label { 1.0 } else { 0.0 };
        Self {
            date,
            benchmark: benchmark.into(),
            regime_label: label,
            regime_id: label.id(),
            regime_prob_bull: hot(RegimeLabel::Bull),
            regime_prob_bear: hot(RegimeLabel::Bear),
            regime_prob_choppy: hot(RegimeLabel::Choppy),
            regime_prob_crash: hot(RegimeLabel::Crash),
        }
    }

    pub fn probability(&self, label: RegimeLabel) -> f64 {
        match label {
            RegimeLabel::Bull => self.regime_prob_bull,
            RegimeLabel::Bear => self.regime_prob_bear,
            RegimeLabel::Choppy => self.regime_prob_choppy,
            RegimeLabel::Crash => self.regime_prob_crash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_variant_order() {
        let ids: Vec<u8> = RegimeLabel::ALL.iter().map(|l| l.id()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn one_hot_sums_to_one() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        for label in RegimeLabel::ALL {
            let rec = RegimeRecord::one_hot(date, "SPY", label);
            let total: f64 = RegimeLabel::ALL.iter().map(|l| rec.probability(*l)).sum();
            assert_eq!(total, 1.0);
            assert_eq!(rec.probability(label), 1.0);
            assert_eq!(rec.regime_id, label.id());
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Crash".parse::<RegimeLabel>().unwrap(), RegimeLabel::Crash);
        assert!("sideways".parse::<RegimeLabel>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&RegimeLabel::Choppy).unwrap();
        assert_eq!(json, "\"choppy\"");
    }
}
