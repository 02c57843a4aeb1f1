//! End-to-end run: bars → regimes → signals → scores → positions → backtest.
//!
//! Per-instrument work (signal build, combine, realized vol, sizing) is
//! independent and runs on rayon when `parallel` is set. Results are collected
//! in instrument order and sorted by (date, instrument), so sequential and
//! parallel runs produce identical tables.

use crate::config::{ConfigError, PipelineConfig, RunId};
use crate::data_loader::{load_bars, LoadError, LoadOptions, LoadedData};
use crate::report::{summarize, BacktestSummary};
use crate::store::{CsvTableStore, StoreError, TableStore};
use hybridalpha_core::alphas::build_alpha_signals;
use hybridalpha_core::backtest::{self, BacktestOutput};
use hybridalpha_core::combiner::SignalCombiner;
use hybridalpha_core::domain::{
    AlphaScoreRow, AlphaSignalRow, Bar, ModelPrediction, Position, PredictionRow, RegimeRecord,
};
use hybridalpha_core::regime;
use hybridalpha_core::sizing::{self, RealizedVolTable};
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Invalid(#[from] hybridalpha_core::ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub parallel: bool,
    pub synthetic: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            synthetic: false,
        }
    }
}

/// Every table a run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub run_id: RunId,
    pub dataset_hash: String,
    pub has_synthetic: bool,
    pub regimes: Vec<RegimeRecord>,
    pub signals: Vec<AlphaSignalRow>,
    pub alpha_scores: Vec<AlphaScoreRow>,
    pub positions: Vec<Position>,
    pub backtest: BacktestOutput,
    pub summary: BacktestSummary,
}

/// Signals, scores and positions of one instrument.
struct InstrumentOutput {
    signals: Vec<AlphaSignalRow>,
    alpha_scores: Vec<AlphaScoreRow>,
    positions: Vec<Position>,
}

/// Run with inputs read from `config.paths.data_dir`.
pub fn run_pipeline(
    config: &PipelineConfig,
    opts: PipelineOptions,
) -> Result<PipelineOutput, PipelineError> {
    let inputs = CsvTableStore::new(&config.paths.data_dir);
    run_pipeline_with(config, opts, &inputs)
}

/// Run with optional signal and prediction tables read from `inputs`.
pub fn run_pipeline_with<S: TableStore>(
    config: &PipelineConfig,
    opts: PipelineOptions,
    inputs: &S,
) -> Result<PipelineOutput, PipelineError> {
    config.validate()?;
    let run_id = config.run_id();
    tracing::info!(
        run_id = %&run_id[..12],
        strategy = %config.backtest.strategy_name,
        "pipeline start"
    );

    let data = load_bars(
        &config.symbols(),
        &LoadOptions {
            data_dir: config.paths.data_dir.clone(),
            synthetic: opts.synthetic,
            start: config.synthetic.start,
            end: config.synthetic.end,
        },
    )?;
    tracing::info!(
        symbols = data.bars.len(),
        synthetic = data.has_synthetic,
        "bars loaded"
    );

    let regimes = classify_benchmark(config, &data)?;
    let benchmark = data.get(&config.universe.benchmark);

    let combiner = SignalCombiner::new(config.weights.clone(), config.model.horizon)?;
    let instruments = instruments(config);
    let work = |symbol: &String| {
        process_instrument(config, inputs, &combiner, symbol, data.get(symbol), benchmark, &regimes)
    };
    let per_instrument: Vec<InstrumentOutput> = if opts.parallel {
        instruments
            .par_iter()
            .map(work)
            .collect::<Result<Vec<_>, PipelineError>>()?
    } else {
        instruments
            .iter()
            .map(work)
            .collect::<Result<Vec<_>, PipelineError>>()?
    };

    let mut signals = Vec::new();
    let mut alpha_scores = Vec::new();
    let mut positions = Vec::new();
    for out in per_instrument {
        signals.extend(out.signals);
        alpha_scores.extend(out.alpha_scores);
        positions.extend(out.positions);
    }
    signals.sort_by(|a, b| (a.date, &a.instrument).cmp(&(b.date, &b.instrument)));
    alpha_scores.sort_by(|a, b| (a.date, &a.instrument).cmp(&(b.date, &b.instrument)));
    positions.sort_by(|a, b| (a.date, &a.instrument).cmp(&(b.date, &b.instrument)));
    tracing::info!(
        instruments = instruments.len(),
        scores = alpha_scores.len(),
        positions = positions.len(),
        "signals combined and sized"
    );

    let prices: Vec<Bar> = instruments
        .iter()
        .flat_map(|s| data.get(s).iter().cloned())
        .collect();
    let strategy = &config.backtest.strategy_name;
    let mut result = backtest::run(&prices, &positions, strategy);
    result.attach_regimes(&regimes);

    let summary = summarize(
        &result.portfolio,
        &result.trades,
        strategy,
        config.backtest.risk_free_rate,
    );
    tracing::info!(
        sharpe = summary.sharpe,
        max_drawdown = summary.max_drawdown,
        trades = summary.num_trades,
        "backtest summarized"
    );

    Ok(PipelineOutput {
        run_id,
        dataset_hash: data.dataset_hash,
        has_synthetic: data.has_synthetic,
        regimes,
        signals,
        alpha_scores,
        positions,
        backtest: result,
        summary,
    })
}

/// Load the benchmark only and classify its regimes.
pub fn run_regimes(
    config: &PipelineConfig,
    synthetic: bool,
) -> Result<Vec<RegimeRecord>, PipelineError> {
    config.regime.validate()?;
    let data = load_bars(
        &[config.universe.benchmark.clone()],
        &LoadOptions {
            data_dir: config.paths.data_dir.clone(),
            synthetic,
            start: config.synthetic.start,
            end: config.synthetic.end,
        },
    )?;
    classify_benchmark(config, &data)
}

fn classify_benchmark(
    config: &PipelineConfig,
    data: &LoadedData,
) -> Result<Vec<RegimeRecord>, PipelineError> {
    let benchmark = &config.universe.benchmark;
    let bars = data.get(benchmark);
    if bars.is_empty() {
        return Err(hybridalpha_core::ConfigError::MissingBenchmark(benchmark.clone()).into());
    }
    let regimes = regime::classify(bars, &config.regime)?;
    tracing::info!(benchmark = %benchmark, dates = regimes.len(), "regimes classified");
    Ok(regimes)
}

/// Configured instruments in order, without duplicates.
fn instruments(config: &PipelineConfig) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for s in &config.universe.instruments {
        if !out.contains(s) {
            out.push(s.clone());
        }
    }
    out
}

fn process_instrument<S: TableStore>(
    config: &PipelineConfig,
    inputs: &S,
    combiner: &SignalCombiner,
    symbol: &str,
    bars: &[Bar],
    benchmark: &[Bar],
    regimes: &[RegimeRecord],
) -> Result<InstrumentOutput, PipelineError> {
    let signals = match read_optional::<AlphaSignalRow, S>(inputs, &format!("signals/{symbol}"))? {
        Some(rows) => rows.into_iter().filter(|r| r.instrument == symbol).collect(),
        None => build_alpha_signals(bars, benchmark, &config.alphas),
    };

    let predictions: Vec<ModelPrediction> =
        read_optional::<PredictionRow, S>(inputs, &format!("predictions/{symbol}"))?
            .unwrap_or_else(|| {
                tracing::debug!(symbol, "no predictions; model signal is zero");
                Vec::new()
            })
            .into_iter()
            .map(ModelPrediction::from)
            .collect();

    let alpha_scores = combiner.combine(&signals, &predictions, regimes);

    let mut vols = RealizedVolTable::new();
    vols.insert_bars(bars, config.risk.vol_window);
    let positions = sizing::size_with(
        &config.risk.sizer(),
        &alpha_scores,
        &vols,
        &config.backtest.strategy_name,
    );

    Ok(InstrumentOutput {
        signals,
        alpha_scores,
        positions,
    })
}

/// Read a table if present. A missing required column is a configuration error.
fn read_optional<T: DeserializeOwned, S: TableStore>(
    store: &S,
    name: &str,
) -> Result<Option<Vec<T>>, PipelineError> {
    if !store.exists(name) {
        return Ok(None);
    }
    match store.read_table(name) {
        Ok(rows) => Ok(Some(rows)),
        Err(StoreError::MissingColumn { table, column }) => {
            Err(hybridalpha_core::ConfigError::MissingColumn { table, column }.into())
        }
        Err(e) => Err(e.into()),
    }
}
