//! Bar loading for the pipeline.
//!
//! For each symbol the loader tries, in order:
//! 1. the Parquet cache under `data_dir` → use it, unless `bars/{SYM}.csv`
//!    was modified after the cache was written
//! 2. a flat CSV file `data_dir/bars/{SYM}.csv` → use it and cache it
//! 3. with `synthetic` on → a deterministic random walk (tagged)
//! 4. otherwise → fail naming the symbol
//!
//! Synthetic bars exist for smoke runs only. Runs that used them are tagged.

use chrono::{Datelike, NaiveDate};
use hybridalpha_core::data::{CacheError, ParquetCache};
use hybridalpha_core::domain::Bar;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no bars for '{symbol}' in cache or {csv} (use --synthetic for synthetic data)")]
    NotFound { symbol: String, csv: PathBuf },

    #[error("failed to read bars for '{symbol}' from {path}: {source}")]
    Csv {
        symbol: String,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("bars file {0} has no rows")]
    Empty(PathBuf),

    #[error("cache: {0}")]
    Cache(#[from] CacheError),
}

/// Where a symbol's bars came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Cache,
    Csv,
    Synthetic,
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub data_dir: PathBuf,
    /// Generate bars for symbols with no data instead of failing.
    pub synthetic: bool,
    /// Date range of generated bars.
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug)]
pub struct LoadedData {
    /// Bars per symbol, each sorted by date.
    pub bars: BTreeMap<String, Vec<Bar>>,
    pub sources: BTreeMap<String, DataSource>,
    /// BLAKE3 over all loaded bars in symbol order.
    pub dataset_hash: String,
    pub has_synthetic: bool,
}

impl LoadedData {
    pub fn get(&self, symbol: &str) -> &[Bar] {
        self.bars.get(symbol).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// One row of a flat bars CSV. Accepts the common `ticker`/`adj_close` spellings.
#[derive(Debug, Deserialize)]
struct CsvBar {
    date: NaiveDate,
    #[serde(default, alias = "ticker", alias = "symbol")]
    instrument: Option<String>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default, alias = "adj_close")]
    adjusted_close: Option<f64>,
    #[serde(default)]
    volume: Option<f64>,
}

impl CsvBar {
    fn into_bar(self, symbol: &str) -> Bar {
        Bar {
            date: self.date,
            instrument: self.instrument.unwrap_or_else(|| symbol.to_string()),
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            adjusted_close: self.adjusted_close.unwrap_or(self.close),
            volume: self.volume.map(|v| v.max(0.0) as u64).unwrap_or(0),
        }
    }
}

pub fn csv_bars_path(data_dir: &Path, symbol: &str) -> PathBuf {
    data_dir.join("bars").join(format!("{symbol}.csv"))
}

/// Load bars for every symbol, applying the fallback order above.
pub fn load_bars(symbols: &[String], opts: &LoadOptions) -> Result<LoadedData, LoadError> {
    let cache = ParquetCache::new(&opts.data_dir);
    let mut bars = BTreeMap::new();
    let mut sources = BTreeMap::new();
    let mut has_synthetic = false;

    for symbol in symbols {
        let csv_path = csv_bars_path(&opts.data_dir, symbol);
        if csv_is_newer(&cache, symbol, &csv_path) {
            tracing::info!(symbol = %symbol, "CSV changed since it was cached; reloading");
        } else if let Ok(cached) = cache.load(symbol) {
            tracing::debug!(symbol = %symbol, bars = cached.len(), "loaded from cache");
            bars.insert(symbol.clone(), cached);
            sources.insert(symbol.clone(), DataSource::Cache);
            continue;
        }

        if csv_path.is_file() {
            let loaded = read_csv_bars(symbol, &csv_path)?;
            if let Err(e) = cache.write(symbol, &loaded) {
                tracing::warn!(symbol = %symbol, error = %e, "could not cache CSV bars");
            }
            tracing::debug!(symbol = %symbol, bars = loaded.len(), "loaded from CSV");
            bars.insert(symbol.clone(), loaded);
            sources.insert(symbol.clone(), DataSource::Csv);
            continue;
        }

        if opts.synthetic {
            tracing::warn!(symbol = %symbol, "generating synthetic bars; results will be tagged");
            bars.insert(
                symbol.clone(),
                generate_synthetic_bars(symbol, opts.start, opts.end),
            );
            sources.insert(symbol.clone(), DataSource::Synthetic);
            has_synthetic = true;
            continue;
        }

        return Err(LoadError::NotFound {
            symbol: symbol.clone(),
            csv: csv_path,
        });
    }

    let dataset_hash = compute_dataset_hash(&bars);
    Ok(LoadedData {
        bars,
        sources,
        dataset_hash,
        has_synthetic,
    })
}

fn csv_is_newer(cache: &ParquetCache, symbol: &str, csv_path: &Path) -> bool {
    let modified = fs::metadata(csv_path).and_then(|m| m.modified()).ok();
    match (modified, cache.written_at(symbol)) {
        (Some(csv), Some(cached)) => csv > cached,
        _ => false,
    }
}

fn read_csv_bars(symbol: &str, path: &Path) -> Result<Vec<Bar>, LoadError> {
    let csv_err = |source| LoadError::Csv {
        symbol: symbol.to_string(),
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = csv::Reader::from_path(path).map_err(csv_err)?;
    let mut out = Vec::new();
    for row in rdr.deserialize::<CsvBar>() {
        out.push(row.map_err(csv_err)?.into_bar(symbol));
    }
    let total = out.len();
    out.retain(|b| !b.is_void());
    if out.len() < total {
        tracing::warn!(symbol, dropped = total - out.len(), "skipped CSV rows with missing prices");
    }
    if out.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }
    out.sort_by_key(|b| b.date);
    out.dedup_by_key(|b| b.date);
    Ok(out)
}

/// Deterministic BLAKE3 over dates and OHLCV in sorted symbol order.
fn compute_dataset_hash(bars: &BTreeMap<String, Vec<Bar>>) -> String {
    let mut hasher = blake3::Hasher::new();
    for (symbol, series) in bars {
        hasher.update(symbol.as_bytes());
        for bar in series {
            hasher.update(bar.date.to_string().as_bytes());
            hasher.update(&bar.open.to_le_bytes());
            hasher.update(&bar.high.to_le_bytes());
            hasher.update(&bar.low.to_le_bytes());
            hasher.update(&bar.close.to_le_bytes());
            hasher.update(&bar.adjusted_close.to_le_bytes());
            hasher.update(&bar.volume.to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}

/// Random walk from 100.0 on weekdays in `[start, end]`, seeded by the symbol.
pub fn generate_synthetic_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        let weekday = current.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.02..0.0205);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        bars.push(Bar {
            date: current,
            instrument: symbol.to_string(),
            open,
            high,
            low,
            close,
            adjusted_close: close,
            volume,
        });

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn opts(dir: &Path, synthetic: bool) -> LoadOptions {
        LoadOptions {
            data_dir: dir.to_path_buf(),
            synthetic,
            start: d(2024, 1, 1),
            end: d(2024, 3, 31),
        }
    }

    fn sample_bars(symbol: &str) -> Vec<Bar> {
        vec![
            Bar {
                date: d(2024, 1, 2),
                instrument: symbol.into(),
                open: 100.0,
                high: 102.0,
                low: 99.0,
                close: 101.0,
                adjusted_close: 101.0,
                volume: 1000,
            },
            Bar {
                date: d(2024, 1, 3),
                instrument: symbol.into(),
                open: 101.0,
                high: 103.0,
                low: 100.0,
                close: 102.0,
                adjusted_close: 102.0,
                volume: 1100,
            },
        ]
    }

    #[test]
    fn load_from_cache_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        ParquetCache::new(dir.path())
            .write("SPY", &sample_bars("SPY"))
            .unwrap();

        let loaded = load_bars(&["SPY".into()], &opts(dir.path(), false)).unwrap();
        assert_eq!(loaded.get("SPY").len(), 2);
        assert_eq!(loaded.sources["SPY"], DataSource::Cache);
        assert!(!loaded.has_synthetic);
        assert_eq!(loaded.dataset_hash.len(), 64);
    }

    #[test]
    fn csv_bars_are_sorted_and_cached() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("bars")).unwrap();
        fs::write(
            csv_bars_path(dir.path(), "AAPL"),
            "date,ticker,open,high,low,close,adj_close,volume\n\
             2024-01-03,AAPL,11,12,10,11.5,11.4,200\n\
             2024-01-02,AAPL,10,11,9,10.5,10.4,100\n",
        )
        .unwrap();

        let loaded = load_bars(&["AAPL".into()], &opts(dir.path(), false)).unwrap();
        let bars = loaded.get("AAPL");
        assert_eq!(loaded.sources["AAPL"], DataSource::Csv);
        assert_eq!(bars[0].date, d(2024, 1, 2));
        assert_eq!(bars[0].adjusted_close, 10.4);
        assert_eq!(bars[1].volume, 200);
        assert!(ParquetCache::new(dir.path()).contains("AAPL"));

        let again = load_bars(&["AAPL".into()], &opts(dir.path(), false)).unwrap();
        assert_eq!(again.sources["AAPL"], DataSource::Cache);
        assert_eq!(again.dataset_hash, loaded.dataset_hash);
    }

    #[test]
    fn edited_csv_replaces_cached_bars() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("bars")).unwrap();
        let path = csv_bars_path(dir.path(), "AAPL");
        fs::write(&path, "date,open,high,low,close\n2024-01-02,10,11,9,10.5\n").unwrap();
        let first = load_bars(&["AAPL".into()], &opts(dir.path(), false)).unwrap();
        assert_eq!(first.get("AAPL").len(), 1);

        fs::write(
            &path,
            "date,open,high,low,close\n2024-01-02,10,11,9,10.5\n2024-01-03,11,12,10,11.5\n",
        )
        .unwrap();
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(SystemTime::now() + Duration::from_secs(60))
            .unwrap();

        let second = load_bars(&["AAPL".into()], &opts(dir.path(), false)).unwrap();
        assert_eq!(second.sources["AAPL"], DataSource::Csv);
        assert_eq!(second.get("AAPL").len(), 2);
        assert_eq!(ParquetCache::new(dir.path()).meta("AAPL").unwrap().bar_count, 2);
    }

    #[test]
    fn csv_without_optional_columns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("bars")).unwrap();
        fs::write(
            csv_bars_path(dir.path(), "MSFT"),
            "date,open,high,low,close\n2024-01-02,10,11,9,10.5\n",
        )
        .unwrap();

        let loaded = load_bars(&["MSFT".into()], &opts(dir.path(), false)).unwrap();
        let bar = &loaded.get("MSFT")[0];
        assert_eq!(bar.instrument, "MSFT");
        assert_eq!(bar.adjusted_close, 10.5);
        assert_eq!(bar.volume, 0);
    }

    #[test]
    fn csv_rows_without_close_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("bars")).unwrap();
        fs::write(
            csv_bars_path(dir.path(), "MSFT"),
            "date,open,high,low,close
2024-01-02,10,11,9,NaN
2024-01-03,10,11,9,10.5
",
        )
        .unwrap();

        let loaded = load_bars(&["MSFT".into()], &opts(dir.path(), false)).unwrap();
        assert_eq!(loaded.get("MSFT").len(), 1);
        assert_eq!(loaded.get("MSFT")[0].date, d(2024, 1, 3));
    }

    #[test]
    fn missing_data_fails_without_synthetic() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_bars(&["SPY".into()], &opts(dir.path(), false)).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { ref symbol, .. } if symbol == "SPY"));
        assert!(err.to_string().contains("--synthetic"));
    }

    #[test]
    fn synthetic_fallback_is_tagged() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_bars(&["FAKE".into()], &opts(dir.path(), true)).unwrap();
        assert!(loaded.has_synthetic);
        assert_eq!(loaded.sources["FAKE"], DataSource::Synthetic);
        assert!(!loaded.get("FAKE").is_empty());
    }

    #[test]
    fn synthetic_bars_skip_weekends_and_are_deterministic() {
        let a = generate_synthetic_bars("SPY", d(2024, 1, 1), d(2024, 1, 31));
        let b = generate_synthetic_bars("SPY", d(2024, 1, 1), d(2024, 1, 31));
        assert_eq!(a, b);
        assert_eq!(a.len(), 23);
        assert!(a
            .iter()
            .all(|bar| !matches!(bar.date.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun)));
        assert!(a.iter().all(Bar::is_sane));
    }

    #[test]
    fn different_symbols_get_different_walks() {
        let spy = generate_synthetic_bars("SPY", d(2024, 1, 1), d(2024, 1, 31));
        let qqq = generate_synthetic_bars("QQQ", d(2024, 1, 1), d(2024, 1, 31));
        assert_eq!(spy.len(), qqq.len());
        assert_ne!(spy[0].close, qqq[0].close);
    }
}
