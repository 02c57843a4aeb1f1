//! HybridAlpha Runner — configuration, data loading, pipeline orchestration,
//! and run artifacts.
//!
//! This crate builds on `hybridalpha-core` to provide:
//! - TOML pipeline configuration with a content-addressed run id
//! - Bar loading with cache/CSV/synthetic fallback
//! - Table storage behind the `TableStore` trait
//! - The end-to-end pipeline, sequential or parallel per instrument
//! - Performance metrics, summary, and Markdown/JSON/CSV artifacts
//! - Per-instrument inspection of a saved run

pub mod config;
pub mod data_loader;
pub mod export;
pub mod inspect;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod store;

pub use config::{ConfigError, PipelineConfig, RunId};
pub use data_loader::{load_bars, DataSource, LoadError, LoadOptions, LoadedData};
pub use export::{load_manifest, save_artifacts, write_artifacts, RunManifest, SCHEMA_VERSION};
pub use inspect::{inspect_alpha_scores, inspect_signals, InspectQuery};
pub use pipeline::{
    run_pipeline, run_pipeline_with, run_regimes, PipelineError, PipelineOptions, PipelineOutput,
};
pub use report::{summarize, BacktestSummary};
pub use store::{CsvTableStore, StoreError, TableStore};
