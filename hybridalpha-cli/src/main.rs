//! HybridAlpha CLI — pipeline runs, regime inspection, and cache status.
//!
//! Commands:
//! - `run` — execute the full pipeline from a TOML config and save artifacts
//! - `regimes` — classify the benchmark and print the regime breakdown
//! - `show` — print the summary of a saved run directory
//! - `inspect` — list one instrument's signals or alpha scores from a saved run
//! - `cache status` — report cached symbols and date ranges

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use hybridalpha_core::data::ParquetCache;
use hybridalpha_core::domain::{AlphaScoreRow, AlphaSignalRow, RegimeLabel};
use hybridalpha_runner::{
    inspect_alpha_scores, inspect_signals, load_manifest, run_pipeline, run_regimes,
    save_artifacts, CsvTableStore, InspectQuery, PipelineConfig, PipelineOptions, RunManifest,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "hybridalpha",
    about = "HybridAlpha CLI — regime-aware signal fusion and daily backtests"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and save artifacts.
    ///
    /// Bars come from the Parquet cache under the data dir. A `bars/{SYM}.csv`
    /// edited after it was cached replaces the cached bars.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Generate synthetic bars for symbols with no data.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Process instruments one at a time instead of in parallel.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Override `paths.output_dir`.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Classify benchmark regimes and print the breakdown.
    Regimes {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Generate synthetic bars if the benchmark has no data.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Number of most recent dates to list.
        #[arg(long, default_value_t = 10)]
        tail: usize,
    },
    /// Print the summary of a saved run.
    Show {
        /// Run directory containing summary.json.
        run_dir: PathBuf,

        /// Print the full manifest as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List one instrument's signals (or alpha scores) from a saved run.
    Inspect {
        /// Run directory written by `run`.
        #[arg(long)]
        run_dir: PathBuf,

        /// Instrument to list.
        #[arg(long)]
        ticker: String,

        /// First date to include (YYYY-MM-DD).
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last date to include (YYYY-MM-DD).
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Show fused alpha scores instead of raw signals.
        #[arg(long, default_value_t = false)]
        alpha: bool,

        /// Print rows as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report cached symbols, date ranges, and bar counts.
    Status {
        /// Data directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            synthetic,
            sequential,
            output_dir,
        } => run_cmd(&config, synthetic, sequential, output_dir),
        Commands::Regimes {
            config,
            synthetic,
            tail,
        } => regimes_cmd(&config, synthetic, tail),
        Commands::Show { run_dir, json } => {
            init_tracing("warn");
            let manifest = load_manifest(&run_dir)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&manifest)?);
            } else {
                print_summary(&manifest);
            }
            Ok(())
        }
        Commands::Inspect {
            run_dir,
            ticker,
            start,
            end,
            alpha,
            json,
        } => {
            init_tracing("warn");
            let query = InspectQuery::new(ticker).between(start, end);
            inspect_cmd(&run_dir, &query, alpha, json)
        }
        Commands::Cache { action } => match action {
            CacheAction::Status { data_dir } => {
                init_tracing("warn");
                cache_status(&data_dir)
            }
        },
    }
}

/// `RUST_LOG` wins; otherwise the configured level.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: &Path) -> Result<PipelineConfig> {
    let config = PipelineConfig::load(path)?;
    init_tracing(&config.logging.level);
    Ok(config)
}

fn run_cmd(
    config_path: &Path,
    synthetic: bool,
    sequential: bool,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(dir) = output_dir {
        config.paths.output_dir = dir;
    }

    let opts = PipelineOptions {
        parallel: !sequential,
        synthetic,
    };
    tracing::info!(
        config = %config_path.display(),
        instruments = config.universe.instruments.len(),
        parallel = opts.parallel,
        "starting run"
    );
    let output = run_pipeline(&config, opts)
        .with_context(|| format!("pipeline failed for {}", config_path.display()))?;
    let run_dir = save_artifacts(&config, &output)?;
    tracing::info!(run_id = %output.run_id, dir = %run_dir.display(), "run saved");

    let manifest = RunManifest::new(&config, &output);
    print_summary(&manifest);
    println!();
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn regimes_cmd(config_path: &Path, synthetic: bool, tail: usize) -> Result<()> {
    let config = load_config(config_path)?;
    let regimes = run_regimes(&config, synthetic)
        .with_context(|| format!("regime classification failed for {}", config.universe.benchmark))?;

    let mut counts: BTreeMap<RegimeLabel, usize> = BTreeMap::new();
    for r in &regimes {
        *counts.entry(r.regime_label).or_default() += 1;
    }

    println!("Benchmark: {}", config.universe.benchmark);
    println!("Dates:     {}", regimes.len());
    println!();
    println!("{:<8} {:>8} {:>8}", "Regime", "Days", "Share");
    println!("{}", "-".repeat(26));
    for label in RegimeLabel::ALL {
        let n = counts.get(&label).copied().unwrap_or(0);
        let share = if regimes.is_empty() {
            0.0
        } else {
            n as f64 / regimes.len() as f64
        };
        println!("{:<8} {:>8} {:>7.1}%", label.as_str(), n, share * 100.0);
    }

    if tail > 0 && !regimes.is_empty() {
        println!();
        println!("Most recent:");
        for r in regimes.iter().skip(regimes.len().saturating_sub(tail)) {
            println!("  {}  {}", r.date, r.regime_label);
        }
    }
    Ok(())
}

fn inspect_cmd(run_dir: &Path, query: &InspectQuery, alpha: bool, json: bool) -> Result<()> {
    let store = CsvTableStore::new(run_dir);
    if alpha {
        let rows = inspect_alpha_scores(&store, query)
            .with_context(|| format!("failed to read alpha scores from {}", run_dir.display()))?;
        if json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        } else {
            print_alpha_scores(query, &rows);
        }
    } else {
        let rows = inspect_signals(&store, query)
            .with_context(|| format!("failed to read signals from {}", run_dir.display()))?;
        if json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        } else {
            print_signals(query, &rows);
        }
    }
    Ok(())
}

fn fmt_signal(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"))
}

fn print_signals(query: &InspectQuery, rows: &[AlphaSignalRow]) {
    if rows.is_empty() {
        println!("No signals for {}", query.instrument);
        return;
    }
    println!("Signals: {} ({} rows)", query.instrument, rows.len());
    println!();
    println!(
        "{:<12} {:>9} {:>9} {:>9} {:>9}",
        "Date", "Trend", "MeanRev", "Vol", "RelStr"
    );
    println!("{}", "-".repeat(52));
    for r in rows {
        println!(
            "{:<12} {:>9} {:>9} {:>9} {:>9}",
            r.date.to_string(),
            fmt_signal(r.trend_alpha),
            fmt_signal(r.mean_reversion_alpha),
            fmt_signal(r.vol_alpha),
            fmt_signal(r.rel_strength_alpha)
        );
    }
}

fn print_alpha_scores(query: &InspectQuery, rows: &[AlphaScoreRow]) {
    if rows.is_empty() {
        println!("No alpha scores for {}", query.instrument);
        return;
    }
    println!("Alpha scores: {} ({} rows)", query.instrument, rows.len());
    println!();
    println!(
        "{:<12} {:<8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "Date", "Regime", "Score", "Trend", "MeanRev", "Vol", "RelStr", "ML"
    );
    println!("{}", "-".repeat(77));
    for r in rows {
        println!(
            "{:<12} {:<8} {:>8.4} {:>8.4} {:>8.4} {:>8.4} {:>8.4} {:>8.4}",
            r.date.to_string(),
            r.regime_label.as_str(),
            r.alpha_score,
            r.contrib_trend,
            r.contrib_mean_rev,
            r.contrib_vol,
            r.contrib_rel_strength,
            r.contrib_ml
        );
    }
}

fn cache_status(data_dir: &Path) -> Result<()> {
    if !data_dir.exists() {
        println!("Data directory does not exist: {}", data_dir.display());
        return Ok(());
    }

    let cache = ParquetCache::new(data_dir);
    let mut rows: Vec<(String, String, usize)> = Vec::new();
    for entry in std::fs::read_dir(data_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        let Some(symbol) = name.strip_prefix("symbol=") else {
            continue;
        };
        let (range, bars) = match cache.meta(symbol) {
            Some(meta) => (
                format!("{} to {}", meta.start_date, meta.end_date),
                meta.bar_count,
            ),
            None => ("(no meta)".into(), 0),
        };
        rows.push((symbol.to_string(), range, bars));
    }

    if rows.is_empty() {
        println!("Cache is empty: {}", data_dir.display());
        return Ok(());
    }
    rows.sort_by(|a, b| a.0.cmp(&b.0));

    println!("Cache: {}", data_dir.display());
    println!("Symbols: {}", rows.len());
    println!();
    println!("{:<8} {:<25} {:>8}", "Symbol", "Date Range", "Bars");
    println!("{}", "-".repeat(43));
    for (sym, range, bars) in &rows {
        println!("{sym:<8} {range:<25} {bars:>8}");
    }
    Ok(())
}

fn print_summary(manifest: &RunManifest) {
    let s = &manifest.summary;
    let period = match (s.start_date, s.end_date) {
        (Some(a), Some(b)) => format!("{a} to {b}"),
        _ => "-".to_string(),
    };

    println!();
    println!("=== Backtest Result ===");
    println!("Strategy:       {}", s.strategy_name);
    println!("Run ID:         {}", &manifest.run_id[..12.min(manifest.run_id.len())]);
    println!("Period:         {period}");
    println!(
        "Universe:       {} vs {}",
        manifest.config.universe.instruments.join(", "),
        manifest.config.universe.benchmark
    );
    if manifest.synthetic {
        println!("Data:           SYNTHETIC");
    }
    println!("Trades:         {}", s.num_trades);
    println!("Realized days:  {}", s.realized_days);
    println!();
    println!("--- Performance ---");
    println!("Total Return:   {:.2}%", s.total_return * 100.0);
    println!("CAGR:           {:.2}%", s.cagr * 100.0);
    println!("Sharpe:         {:.3}", s.sharpe);
    println!("Sortino:        {:.3}", s.sortino);
    println!("Max Drawdown:   {:.2}%", s.max_drawdown * 100.0);
    println!("Win Rate:       {:.1}%", s.win_rate * 100.0);

    if !s.pnl_by_regime.is_empty() {
        println!();
        println!("--- P&L by Regime ---");
        for (label, pnl) in &s.pnl_by_regime {
            println!("{label:<15} {:.4}%", pnl * 100.0);
        }
    }
}
