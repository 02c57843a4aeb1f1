//! Criterion benchmarks for the pipeline stages.
//!
//! 1. Regime classification over a benchmark series
//! 2. Alpha signal build per instrument
//! 3. Combine + size for a multi-instrument universe
//! 4. Backtest over sized positions

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use hybridalpha_core::alphas::{build_alpha_signals, AlphaParams};
use hybridalpha_core::backtest;
use hybridalpha_core::combiner::{RegimeWeightTable, SignalCombiner, SignalWeights};
use hybridalpha_core::domain::{AlphaSignalRow, Bar, Position, RegimeLabel};
use hybridalpha_core::regime::{classify, RegimeParams};
use hybridalpha_core::sizing::{self, RealizedVolTable};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(instrument: &str, n: usize, phase: f64) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2015, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1 + phase).sin() * 10.0 + i as f64 * 0.01;
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                instrument: instrument.to_string(),
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
                adjusted_close: close,
                volume: 1_000_000 + (i as u64 % 500_000),
            }
        })
        .collect()
}

fn make_universe(n: usize, count: usize) -> Vec<Vec<Bar>> {
    (0..count)
        .map(|k| make_bars(&format!("SYM{k:02}"), n, k as f64 * 0.7))
        .collect()
}

fn weights() -> RegimeWeightTable {
    let w = SignalWeights {
        trend_alpha: 0.4,
        mean_reversion_alpha: 0.2,
        vol_alpha: 0.2,
        rel_strength_alpha: 0.2,
        ml: 0.0,
    };
    RegimeWeightTable::new()
        .with(RegimeLabel::Bull, w)
        .with(RegimeLabel::Choppy, w)
}

// ── 1. Regime classification ─────────────────────────────────────────

fn bench_regime(c: &mut Criterion) {
    let mut group = c.benchmark_group("regime_classify");
    for &n in &[252, 1260, 2520] {
        let bars = make_bars("SPY", n, 0.0);
        let params = RegimeParams::default();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| classify(black_box(&bars), black_box(&params)))
        });
    }
    group.finish();
}

// ── 2. Alpha build ───────────────────────────────────────────────────

fn bench_alphas(c: &mut Criterion) {
    let mut group = c.benchmark_group("alpha_build");
    let bench = make_bars("SPY", 2520, 0.0);
    let bars = make_bars("AAA", 2520, 1.3);
    let params = AlphaParams::default();
    group.bench_function("2520_bars", |b| {
        b.iter(|| build_alpha_signals(black_box(&bars), black_box(&bench), &params))
    });
    group.finish();
}

// ── 3. Combine + size ────────────────────────────────────────────────

fn bench_combine_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("combine_and_size");
    let bench = make_bars("SPY", 1260, 0.0);
    let universe = make_universe(1260, 10);
    let regimes = classify(&bench, &RegimeParams::default()).unwrap();
    let signals: Vec<AlphaSignalRow> = universe
        .iter()
        .flat_map(|bars| build_alpha_signals(bars, &bench, &AlphaParams::default()))
        .collect();
    let vols = RealizedVolTable::from_bars(universe.iter().map(Vec::as_slice), 20);
    let combiner = SignalCombiner::new(weights(), 1).unwrap();

    group.bench_function("10_symbols_1260_bars", |b| {
        b.iter(|| {
            let scores = combiner.combine(black_box(&signals), &[], black_box(&regimes));
            sizing::size(&scores, &vols, 0.15, 0.1, "bench")
        })
    });
    group.finish();
}

// ── 4. Backtest ──────────────────────────────────────────────────────

fn bench_backtest(c: &mut Criterion) {
    let mut group = c.benchmark_group("backtest");
    let universe = make_universe(1260, 10);
    let prices: Vec<Bar> = universe.iter().flatten().cloned().collect();
    let positions: Vec<Position> = prices
        .iter()
        .enumerate()
        .map(|(i, b)| Position {
            date: b.date,
            instrument: b.instrument.clone(),
            strategy_name: "bench".into(),
            target_weight: ((i % 21) as f64 - 10.0) / 100.0,
            realized_vol_lookback: None,
            max_weight_applied: false,
        })
        .collect();

    group.bench_function("10_symbols_1260_bars", |b| {
        b.iter(|| backtest::run(black_box(&prices), black_box(&positions), "bench"))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_regime,
    bench_alphas,
    bench_combine_size,
    bench_backtest,
);
criterion_main!(benches);
