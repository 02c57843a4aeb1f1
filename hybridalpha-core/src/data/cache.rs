//! Parquet bar cache with Hive-style partitioning.
//!
//! Layout: `{root}/symbol={SYMBOL}/{year}.parquet` plus a `meta.json`
//! sidecar per symbol. Writes go to `.tmp` and are renamed into place, and
//! a write replaces every partition of the symbol.
//! Partitions that fail validation on load are renamed to
//! `{year}.parquet.quarantined` and skipped.

use crate::domain::Bar;
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

const COLUMNS: [&str; 8] = [
    "date",
    "instrument",
    "open",
    "high",
    "low",
    "close",
    "adjusted_close",
    "volume",
];

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("no cached bars for '{0}'")]
    NotCached(String),

    #[error("nothing to cache for '{0}'")]
    Empty(String),

    #[error("cache I/O at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parquet: {0}")]
    Parquet(String),

    #[error("invalid partition: {0}")]
    Invalid(String),
}

impl CacheError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Sidecar describing what is cached for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMeta {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub bar_count: usize,
    pub data_hash: String,
}

#[derive(Debug, Clone)]
pub struct ParquetCache {
    root: PathBuf,
}

impl ParquetCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn symbol_dir(&self, symbol: &str) -> PathBuf {
        self.root.join(format!("symbol={symbol}"))
    }

    fn meta_path(&self, symbol: &str) -> PathBuf {
        self.symbol_dir(symbol).join("meta.json")
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbol_dir(symbol).is_dir()
    }

    /// Write one symbol's bars, one partition per calendar year.
    pub fn write(&self, symbol: &str, bars: &[Bar]) -> Result<CacheMeta, CacheError> {
        let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
            return Err(CacheError::Empty(symbol.to_string()));
        };

        let dir = self.symbol_dir(symbol);
        fs::create_dir_all(&dir).map_err(|e| CacheError::io(&dir, e))?;

        let mut by_year: BTreeMap<i32, Vec<&Bar>> = BTreeMap::new();
        for bar in bars {
            by_year.entry(bar.date.year()).or_default().push(bar);
        }

        for (year, year_bars) in &by_year {
            let mut df = bars_to_frame(year_bars)?;
            let path = dir.join(format!("{year}.parquet"));
            let tmp = path.with_extension("parquet.tmp");
            let file = fs::File::create(&tmp).map_err(|e| CacheError::io(&tmp, e))?;
            ParquetWriter::new(file)
                .finish(&mut df)
                .map_err(|e| CacheError::Parquet(format!("write {}: {e}", tmp.display())))?;
            if let Err(e) = fs::rename(&tmp, &path) {
                let _ = fs::remove_file(&tmp);
                return Err(CacheError::io(&path, e));
            }
        }
        remove_stale_partitions(&dir, &by_year)?;

        let encoded = serde_json::to_vec(bars)
            .map_err(|e| CacheError::Invalid(format!("hash encoding: {e}")))?;
        let meta = CacheMeta {
            symbol: symbol.to_string(),
            start_date: first.date,
            end_date: last.date,
            bar_count: bars.len(),
            data_hash: blake3::hash(&encoded).to_hex().to_string(),
        };
        let meta_path = self.meta_path(symbol);
        let json = serde_json::to_string_pretty(&meta)
            .map_err(|e| CacheError::Invalid(format!("meta encoding: {e}")))?;
        fs::write(&meta_path, json).map_err(|e| CacheError::io(&meta_path, e))?;

        tracing::debug!(symbol, bars = bars.len(), partitions = by_year.len(), "cached bars");
        Ok(meta)
    }

    /// Load every valid partition for `symbol`, sorted by date.
    pub fn load(&self, symbol: &str) -> Result<Vec<Bar>, CacheError> {
        let dir = self.symbol_dir(symbol);
        if !dir.is_dir() {
            return Err(CacheError::NotCached(symbol.to_string()));
        }

        let mut bars = Vec::new();
        let entries = fs::read_dir(&dir).map_err(|e| CacheError::io(&dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| CacheError::io(&dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("parquet") {
                continue;
            }
            match read_partition(&path, symbol) {
                Ok(part) => bars.extend(part),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "quarantining cache partition");
                    let _ = fs::rename(&path, path.with_extension("parquet.quarantined"));
                }
            }
        }

        if bars.is_empty() {
            return Err(CacheError::NotCached(symbol.to_string()));
        }
        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    pub fn meta(&self, symbol: &str) -> Option<CacheMeta> {
        let content = fs::read_to_string(self.meta_path(symbol)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Modification time of the sidecar, i.e. when `symbol` was last written.
    pub fn written_at(&self, symbol: &str) -> Option<SystemTime> {
        fs::metadata(self.meta_path(symbol))
            .and_then(|m| m.modified())
            .ok()
    }
}

/// Delete `{year}.parquet` files whose year is not in `keep`.
fn remove_stale_partitions<T>(dir: &Path, keep: &BTreeMap<i32, T>) -> Result<(), CacheError> {
    let entries = fs::read_dir(dir).map_err(|e| CacheError::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| CacheError::io(dir, e))?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("parquet") {
            continue;
        }
        let year = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<i32>().ok());
        if year.is_some_and(|y| keep.contains_key(&y)) {
            continue;
        }
        fs::remove_file(&path).map_err(|e| CacheError::io(&path, e))?;
    }
    Ok(())
}

fn epoch() -> NaiveDate {
    NaiveDate::default()
}

fn bars_to_frame(bars: &[&Bar]) -> Result<DataFrame, CacheError> {
    let days: Vec<i32> = bars
        .iter()
        .map(|b| (b.date - epoch()).num_days() as i32)
        .collect();
    let f = |get: fn(&Bar) -> f64| bars.iter().map(|b| get(b)).collect::<Vec<f64>>();

    let date = Column::new("date".into(), days)
        .cast(&DataType::Date)
        .map_err(|e| CacheError::Parquet(format!("date cast: {e}")))?;
    DataFrame::new(vec![
        date,
        Column::new(
            "instrument".into(),
            bars.iter().map(|b| b.instrument.as_str()).collect::<Vec<_>>(),
        ),
        Column::new("open".into(), f(|b| b.open)),
        Column::new("high".into(), f(|b| b.high)),
        Column::new("low".into(), f(|b| b.low)),
        Column::new("close".into(), f(|b| b.close)),
        Column::new("adjusted_close".into(), f(|b| b.adjusted_close)),
        Column::new(
            "volume".into(),
            bars.iter().map(|b| b.volume).collect::<Vec<u64>>(),
        ),
    ])
    .map_err(|e| CacheError::Parquet(format!("frame: {e}")))
}

fn read_partition(path: &Path, symbol: &str) -> Result<Vec<Bar>, CacheError> {
    let file = fs::File::open(path).map_err(|e| CacheError::io(path, e))?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| CacheError::Parquet(format!("read {}: {e}", path.display())))?;

    if df.height() == 0 {
        return Err(CacheError::Invalid("empty partition".into()));
    }
    for name in COLUMNS {
        if df.column(name).is_err() {
            return Err(CacheError::Invalid(format!("missing column '{name}'")));
        }
    }
    frame_to_bars(&df, symbol)
}

fn frame_to_bars(df: &DataFrame, symbol: &str) -> Result<Vec<Bar>, CacheError> {
    let col = |name: &str| {
        df.column(name)
            .map_err(|e| CacheError::Parquet(format!("column '{name}': {e}")))
    };
    let typed = |name: &str, e: PolarsError| CacheError::Parquet(format!("column '{name}' type: {e}"));

    let date = col("date")?.date().map_err(|e| typed("date", e))?;
    let instrument = col("instrument")?.str().map_err(|e| typed("instrument", e))?;
    let open = col("open")?.f64().map_err(|e| typed("open", e))?;
    let high = col("high")?.f64().map_err(|e| typed("high", e))?;
    let low = col("low")?.f64().map_err(|e| typed("low", e))?;
    let close = col("close")?.f64().map_err(|e| typed("close", e))?;
    let adjusted = col("adjusted_close")?.f64().map_err(|e| typed("adjusted_close", e))?;
    let volume = col("volume")?.u64().map_err(|e| typed("volume", e))?;

    (0..df.height())
        .map(|i| {
            let days = date
                .get(i)
                .ok_or_else(|| CacheError::Invalid(format!("null date at row {i}")))?;
            Ok(Bar {
                date: epoch() + chrono::Duration::days(days as i64),
                instrument: instrument.get(i).unwrap_or(symbol).to_string(),
                open: open.get(i).unwrap_or(f64::NAN),
                high: high.get(i).unwrap_or(f64::NAN),
                low: low.get(i).unwrap_or(f64::NAN),
                close: close.get(i).unwrap_or(f64::NAN),
                adjusted_close: adjusted.get(i).unwrap_or(f64::NAN),
                volume: volume.get(i).unwrap_or(0),
            })
        })
        .collect()
}
