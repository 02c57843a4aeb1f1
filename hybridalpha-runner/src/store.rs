//! Table storage behind a small trait so the pipeline never touches paths.
//!
//! A table is a named list of flat serde records. `CsvTableStore` maps
//! the name `a/b` to `{root}/a/b.csv` and JSON documents to `{root}/{name}`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("table '{0}' not found")]
    NotFound(String),

    #[error("table '{table}' is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("table '{table}': {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },

    #[error("document '{name}': {source}")]
    Json {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Classify a CSV error, surfacing "missing field" as a missing column.
    fn from_csv(table: &str, source: csv::Error) -> Self {
        if let csv::ErrorKind::Deserialize { err, .. } = source.kind() {
            if let csv::DeserializeErrorKind::Message(msg) = err.kind() {
                if let Some(column) = missing_field(msg) {
                    return StoreError::MissingColumn {
                        table: table.to_string(),
                        column,
                    };
                }
            }
        }
        StoreError::Csv {
            table: table.to_string(),
            source,
        }
    }
}

/// Extract `name` from serde's "missing field `name`" message.
fn missing_field(msg: &str) -> Option<String> {
    let rest = msg.strip_prefix("missing field `")?;
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}

/// Named-table persistence.
pub trait TableStore: Send + Sync {
    fn exists(&self, name: &str) -> bool;

    fn read_table<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, StoreError>;

    fn write_table<T: Serialize>(&self, name: &str, rows: &[T]) -> Result<(), StoreError>;

    fn write_document<T: Serialize>(&self, name: &str, doc: &T) -> Result<(), StoreError>;

    fn read_document<T: DeserializeOwned>(&self, name: &str) -> Result<T, StoreError>;
}

#[derive(Debug, Clone)]
pub struct CsvTableStore {
    root: PathBuf,
}

impl CsvTableStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.csv"))
    }

    fn ensure_parent(path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }
}

impl TableStore for CsvTableStore {
    fn exists(&self, name: &str) -> bool {
        self.table_path(name).is_file()
    }

    fn read_table<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, StoreError> {
        let path = self.table_path(name);
        if !path.is_file() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        let mut rdr = csv::Reader::from_path(&path).map_err(|e| StoreError::from_csv(name, e))?;
        rdr.deserialize::<T>()
            .map(|row| row.map_err(|e| StoreError::from_csv(name, e)))
            .collect()
    }

    fn write_table<T: Serialize>(&self, name: &str, rows: &[T]) -> Result<(), StoreError> {
        let path = self.table_path(name);
        Self::ensure_parent(&path)?;
        let mut wtr = csv::Writer::from_path(&path).map_err(|e| StoreError::from_csv(name, e))?;
        for row in rows {
            wtr.serialize(row).map_err(|e| StoreError::from_csv(name, e))?;
        }
        wtr.flush().map_err(|source| StoreError::Io { path, source })?;
        Ok(())
    }

    fn write_document<T: Serialize>(&self, name: &str, doc: &T) -> Result<(), StoreError> {
        let path = self.root.join(name);
        Self::ensure_parent(&path)?;
        let json = serde_json::to_string_pretty(doc).map_err(|source| StoreError::Json {
            name: name.to_string(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| StoreError::Io { path, source })
    }

    fn read_document<T: DeserializeOwned>(&self, name: &str) -> Result<T, StoreError> {
        let path = self.root.join(name);
        let text = fs::read_to_string(&path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(name.to_string()),
            _ => StoreError::Io { path, source },
        })?;
        serde_json::from_str(&text).map_err(|source| StoreError::Json {
            name: name.to_string(),
            source,
        })
    }
}
