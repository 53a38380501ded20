//! CSV Table Loader Module
//! Reads a directory of CSV files into Polars DataFrames keyed by file stem.

use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("No table named '{name}' in {dir}")]
    NotFound { name: String, dir: PathBuf },
    #[error("Failed to list {dir}: {source}")]
    Io {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to load CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
}

/// Loaded tables, iterated in name order.
pub type Tables = BTreeMap<String, DataFrame>;

/// Reads the CSV exchange directory written by the collector.
///
/// Every column is read as a string so sentinels survive until cleaning.
pub struct TableLoader {
    dir: PathBuf,
    exclusion_marker: String,
}

impl TableLoader {
    pub fn new(dir: impl Into<PathBuf>, exclusion_marker: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            exclusion_marker: exclusion_marker.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Table names of every CSV file in the directory, sorted.
    pub fn table_names(&self) -> Result<Vec<String>, LoaderError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| LoaderError::Io {
            dir: self.dir.clone(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| LoaderError::Io {
                dir: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !self.exclusion_marker.is_empty() && file_name.contains(&self.exclusion_marker) {
                tracing::debug!(file = file_name, "skipping excluded file");
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Load every discoverable table.
    pub fn load_all(&self) -> Result<Tables, LoaderError> {
        let mut tables = Tables::new();
        for name in self.table_names()? {
            let df = self.read_csv(&self.path_for(&name))?;
            tables.insert(name, df);
        }
        tracing::info!(count = tables.len(), dir = %self.dir.display(), "loaded tables");
        Ok(tables)
    }

    /// Load one table by name (file stem, no extension).
    pub fn load_table(&self, name: &str) -> Result<DataFrame, LoaderError> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(LoaderError::NotFound {
                name: name.to_string(),
                dir: self.dir.clone(),
            });
        }
        self.read_csv(&path)
    }

    /// Like [`load_table`](Self::load_table), but a missing file is reported
    /// and returned as `None`.
    pub fn load_optional(&self, name: &str) -> Result<Option<DataFrame>, LoaderError> {
        match self.load_table(name) {
            Ok(df) => Ok(Some(df)),
            Err(err @ LoaderError::NotFound { .. }) => {
                tracing::warn!("{err}; check the spelling or that the file exists");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.csv"))
    }

    fn read_csv(&self, path: &Path) -> Result<DataFrame, LoaderError> {
        let to_err = |source| LoaderError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()
            .map_err(to_err)?
            .collect()
            .map_err(to_err)?;

        tracing::debug!(path = %path.display(), rows = df.height(), cols = df.width(), "read csv");
        Ok(df)
    }
}
