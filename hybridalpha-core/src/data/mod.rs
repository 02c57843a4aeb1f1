//! On-disk bar storage.

pub mod cache;

pub use cache::{CacheError, CacheMeta, ParquetCache};
