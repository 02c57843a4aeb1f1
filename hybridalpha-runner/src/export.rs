//! Run artifacts: output tables, a JSON manifest, and a Markdown report.
//!
//! Layout of a run directory:
//! - `regimes.csv`, `signals.csv`, `alpha_scores.csv`, `positions.csv`
//! - `pnl_timeseries.csv`, `trades.csv`
//! - `summary.json` — versioned [`RunManifest`]
//! - `report.md`
//!
//! Manifests with a newer `schema_version` are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{PipelineConfig, RunId};
use crate::pipeline::PipelineOutput;
use crate::report::BacktestSummary;
use crate::store::{CsvTableStore, TableStore};

pub const SCHEMA_VERSION: u32 = 1;

pub const SUMMARY_FILE: &str = "summary.json";
pub const SIGNALS_TABLE: &str = "signals";
pub const ALPHA_SCORES_TABLE: &str = "alpha_scores";
pub const REPORT_FILE: &str = "report.md";

/// Contents of `summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u32,
    pub run_id: RunId,
    pub dataset_hash: String,
    /// True when any symbol ran on generated bars.
    pub synthetic: bool,
    pub config: PipelineConfig,
    pub summary: BacktestSummary,
}

impl RunManifest {
    pub fn new(config: &PipelineConfig, output: &PipelineOutput) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            run_id: output.run_id.clone(),
            dataset_hash: output.dataset_hash.clone(),
            synthetic: output.has_synthetic,
            config: config.clone(),
            summary: output.summary.clone(),
        }
    }
}

/// Write every artifact of a run into `config.run_dir()`.
///
/// Returns the run directory.
pub fn save_artifacts(config: &PipelineConfig, output: &PipelineOutput) -> Result<PathBuf> {
    let run_dir = config.run_dir();
    write_artifacts(config, output, &run_dir)?;
    Ok(run_dir)
}

/// Write every artifact of a run into `dir`.
pub fn write_artifacts(config: &PipelineConfig, output: &PipelineOutput, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create run dir: {}", dir.display()))?;
    let store = CsvTableStore::new(dir);

    store.write_table("regimes", &output.regimes)?;
    store.write_table(SIGNALS_TABLE, &output.signals)?;
    store.write_table(ALPHA_SCORES_TABLE, &output.alpha_scores)?;
    store.write_table("positions", &output.positions)?;
    store.write_table("pnl_timeseries", &output.backtest.portfolio)?;
    store.write_table("trades", &output.backtest.trades)?;

    let manifest = RunManifest::new(config, output);
    store
        .write_document(SUMMARY_FILE, &manifest)
        .context("failed to write run summary")?;

    let report = generate_report(&manifest);
    std::fs::write(dir.join(REPORT_FILE), report)
        .with_context(|| format!("failed to write {}", dir.join(REPORT_FILE).display()))?;

    tracing::info!(dir = %dir.display(), "artifacts written");
    Ok(())
}

/// Load `summary.json` from a run directory.
pub fn load_manifest(dir: &Path) -> Result<RunManifest> {
    let store = CsvTableStore::new(dir);
    let manifest: RunManifest = store
        .read_document(SUMMARY_FILE)
        .with_context(|| format!("failed to read {}", dir.join(SUMMARY_FILE).display()))?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}

fn date_or_dash(d: Option<chrono::NaiveDate>) -> String {
    d.map_or_else(|| "-".to_string(), |d| d.to_string())
}

/// Markdown report for one run.
pub fn generate_report(manifest: &RunManifest) -> String {
    let s = &manifest.summary;
    let cfg = &manifest.config;
    let mut md = String::with_capacity(2048);

    md.push_str(&format!("# Backtest Report: {}\n\n", s.strategy_name));

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Run ID | {} |\n", manifest.run_id));
    md.push_str(&format!("| Benchmark | {} |\n", cfg.universe.benchmark));
    md.push_str(&format!(
        "| Instruments | {} |\n",
        cfg.universe.instruments.join(", ")
    ));
    md.push_str(&format!(
        "| Period | {} to {} |\n",
        date_or_dash(s.start_date),
        date_or_dash(s.end_date)
    ));
    md.push_str(&format!("| Dataset Hash | {} |\n", manifest.dataset_hash));
    if manifest.synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    md.push_str("## Risk Budget\n\n");
    md.push_str("| Parameter | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Target Vol | {:.2}% |\n", cfg.risk.target_vol * 100.0));
    md.push_str(&format!("| Max Weight | {:.2}% |\n", cfg.risk.max_weight * 100.0));
    md.push_str(&format!("| Vol Window | {} |\n", cfg.risk.vol_window));
    md.push_str(&format!("| Model Horizon | {} |\n", cfg.model.horizon));
    md.push('\n');

    md.push_str("## Performance Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Total Return | {:.2}% |\n", s.total_return * 100.0));
    md.push_str(&format!("| CAGR | {:.2}% |\n", s.cagr * 100.0));
    md.push_str(&format!("| Sharpe | {:.3} |\n", s.sharpe));
    md.push_str(&format!("| Sortino | {:.3} |\n", s.sortino));
    md.push_str(&format!("| Max Drawdown | {:.2}% |\n", s.max_drawdown * 100.0));
    md.push_str(&format!("| Win Rate | {:.1}% |\n", s.win_rate * 100.0));
    md.push_str(&format!("| Trades | {} |\n", s.num_trades));
    md.push_str(&format!("| Realized Days | {} |\n", s.realized_days));
    md.push('\n');

    md.push_str("## P&L by Regime\n\n");
    if s.pnl_by_regime.is_empty() {
        md.push_str("No regime labels attached.\n");
    } else {
        md.push_str("| Regime | Summed Daily Return |\n");
        md.push_str("| --- | ---: |\n");
        for (label, pnl) in &s.pnl_by_regime {
            md.push_str(&format!("| {label} | {:.4}% |\n", pnl * 100.0));
        }
    }

    md
}
