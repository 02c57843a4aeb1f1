//! Pipeline configuration loaded from TOML.
//!
//! ```toml
//! [universe]
//! benchmark = "SPY"
//! instruments = ["AAPL", "MSFT"]
//!
//! [paths]
//! data_dir = "data"
//! output_dir = "runs"
//!
//! [weights.bull]
//! trend_alpha = 0.4
//! ml = 0.3
//! ```
//!
//! Every other section falls back to its defaults when omitted.

use chrono::NaiveDate;
use hybridalpha_core::alphas::AlphaParams;
use hybridalpha_core::combiner::{RegimeWeightTable, DEFAULT_HORIZON};
use hybridalpha_core::regime::RegimeParams;
use hybridalpha_core::sizing::{SizingParams, DEFAULT_STRATEGY_NAME};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Content-addressed identifier of a run configuration.
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Invalid(#[from] hybridalpha_core::ConfigError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub universe: UniverseConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub regime: RegimeParams,
    #[serde(default)]
    pub weights: RegimeWeightTable,
    #[serde(default)]
    pub risk: SizingParams,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub alphas: AlphaParams,
    #[serde(default)]
    pub backtest: BacktestConfig,
    #[serde(default)]
    pub synthetic: SyntheticConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniverseConfig {
    pub benchmark: String,
    #[serde(default)]
    pub instruments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("runs"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub horizon: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub strategy_name: String,
    /// Annual risk-free rate used by Sharpe and Sortino.
    pub risk_free_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            strategy_name: DEFAULT_STRATEGY_NAME.to_string(),
            risk_free_rate: 0.0,
        }
    }
}

/// Date range for generated bars when `--synthetic` is on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2019, 1, 2).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2023, 12, 29).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Read and parse a config file. Validation is a separate step.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Minimal config over `benchmark` and `instruments` with default parameters
    /// and an empty weight table.
    pub fn new(benchmark: &str, instruments: &[&str]) -> Self {
        Self {
            universe: UniverseConfig {
                benchmark: benchmark.to_string(),
                instruments: instruments.iter().map(|s| s.to_string()).collect(),
            },
            paths: PathsConfig::default(),
            regime: RegimeParams::default(),
            weights: RegimeWeightTable::default(),
            risk: SizingParams::default(),
            model: ModelConfig::default(),
            alphas: AlphaParams::default(),
            backtest: BacktestConfig::default(),
            synthetic: SyntheticConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        use hybridalpha_core::ConfigError as Invalid;

        if self.universe.benchmark.trim().is_empty() {
            return Err(Invalid::MissingBenchmark(self.universe.benchmark.clone()).into());
        }
        if self.universe.instruments.is_empty() {
            return Err(Invalid::invalid("universe.instruments", "must list at least one instrument").into());
        }
        if let Some(blank) = self.universe.instruments.iter().find(|s| s.trim().is_empty()) {
            return Err(Invalid::invalid("universe.instruments", format!("blank symbol '{blank}'")).into());
        }
        self.weights.validate()?;
        self.regime.validate()?;
        self.alphas.validate()?;
        self.risk.validate()?;
        if self.model.horizon == 0 {
            return Err(Invalid::invalid("model.horizon", "must be >= 1").into());
        }
        if self.backtest.strategy_name.trim().is_empty() {
            return Err(Invalid::invalid("backtest.strategy_name", "must not be empty").into());
        }
        if !self.backtest.risk_free_rate.is_finite() {
            return Err(Invalid::invalid("backtest.risk_free_rate", "must be finite").into());
        }
        if self.synthetic.start >= self.synthetic.end {
            return Err(Invalid::invalid("synthetic", "start must be before end").into());
        }
        Ok(())
    }

    /// Benchmark first, then instruments, without duplicates.
    pub fn symbols(&self) -> Vec<String> {
        let mut out = vec![self.universe.benchmark.clone()];
        for s in &self.universe.instruments {
            if !out.contains(s) {
                out.push(s.clone());
            }
        }
        out
    }

    /// BLAKE3 hash of the canonical JSON form of this config.
    ///
    /// Paths and logging are excluded: moving the data or output directory
    /// does not change what a run computes.
    pub fn run_id(&self) -> RunId {
        let mut canonical = self.clone();
        canonical.paths = PathsConfig::default();
        canonical.logging = LoggingConfig::default();
        // plain data with string keys; serialization cannot fail
        let json = serde_json::to_vec(&canonical).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }

    /// Run directory: `{output_dir}/{strategy_name}-{first 12 hex of run_id}`.
    pub fn run_dir(&self) -> PathBuf {
        let id = self.run_id();
        self.paths
            .output_dir
            .join(format!("{}-{}", self.backtest.strategy_name, &id[..12]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hybridalpha_core::domain::RegimeLabel;

    const SAMPLE: &str = r#"
[universe]
benchmark = "SPY"
instruments = ["AAPL", "MSFT"]

[paths]
data_dir = "market"
output_dir = "out"

[regime]
trend_ma_short = 20
trend_ma_long = 100

[weights.bull]
trend_alpha = 0.5
ml = 0.3

[weights.choppy]
mean_reversion_alpha = 0.4

[risk]
target_vol = 0.10

[model]
horizon = 5

[backtest]
strategy_name = "test_strategy"
risk_free_rate = 0.02

[synthetic]
start = "2020-01-01"
end = "2020-06-30"

[logging]
level = "debug"
"#;

    #[test]
    fn parses_all_sections() {
        let cfg = PipelineConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(cfg.universe.benchmark, "SPY");
        assert_eq!(cfg.universe.instruments, vec!["AAPL", "MSFT"]);
        assert_eq!(cfg.paths.data_dir, PathBuf::from("market"));
        assert_eq!(cfg.regime.trend_ma_short, 20);
        assert_eq!(cfg.regime.vol_lookback, 20);
        assert_eq!(cfg.weights.lookup(RegimeLabel::Bull).weights().trend_alpha, 0.5);
        assert_eq!(cfg.weights.lookup(RegimeLabel::Choppy).weights().trend_alpha, 0.0);
        assert_eq!(cfg.risk.target_vol, 0.10);
        assert_eq!(cfg.risk.max_weight, 0.1);
        assert_eq!(cfg.model.horizon, 5);
        assert_eq!(cfg.backtest.strategy_name, "test_strategy");
        assert_eq!(cfg.logging.level, "debug");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn defaults_apply_to_omitted_sections() {
        let cfg = PipelineConfig::from_toml_str(
            "[universe]\nbenchmark = \"SPY\"\ninstruments = [\"AAPL\"]\n[weights.choppy]\nml = 1.0\n",
        )
        .unwrap();
        assert_eq!(cfg.backtest.strategy_name, "hybrid_alpha_mvp");
        assert_eq!(cfg.risk.vol_window, 20);
        assert_eq!(cfg.model.horizon, 1);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn missing_weight_table_is_rejected() {
        let cfg = PipelineConfig::new("SPY", &["AAPL"]);
        let err = cfg.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(hybridalpha_core::ConfigError::MissingWeightTable)
        ));
    }

    #[test]
    fn empty_benchmark_is_rejected() {
        let mut cfg = PipelineConfig::from_toml_str(SAMPLE).unwrap();
        cfg.universe.benchmark = " ".into();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid(hybridalpha_core::ConfigError::MissingBenchmark(_)))
        ));
    }

    #[test]
    fn empty_universe_is_rejected() {
        let mut cfg = PipelineConfig::from_toml_str(SAMPLE).unwrap();
        cfg.universe.instruments.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn symbols_put_benchmark_first_without_duplicates() {
        let mut cfg = PipelineConfig::new("SPY", &["AAPL", "SPY", "MSFT"]);
        cfg.universe.instruments.push("AAPL".into());
        assert_eq!(cfg.symbols(), vec!["SPY", "AAPL", "MSFT"]);
    }

    #[test]
    fn run_id_is_deterministic_and_parameter_sensitive() {
        let a = PipelineConfig::from_toml_str(SAMPLE).unwrap();
        let mut b = a.clone();
        assert_eq!(a.run_id(), b.run_id());
        b.risk.max_weight = 0.2;
        assert_ne!(a.run_id(), b.run_id());
        assert!(a.run_dir().starts_with("out"));
    }

    #[test]
    fn run_id_ignores_paths_and_logging() {
        let a = PipelineConfig::from_toml_str(SAMPLE).unwrap();
        let mut b = a.clone();
        b.paths.output_dir = PathBuf::from("elsewhere");
        b.logging.level = "trace".into();
        assert_eq!(a.run_id(), b.run_id());
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let err = PipelineConfig::load(Path::new("/nonexistent/pipeline.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/pipeline.toml"));
    }
}
