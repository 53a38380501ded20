//! Pipeline Configuration Module
//! Table names, sentinels and cleaning policies, loadable from a JSON file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Placeholder the collector writes for a missing cell.
pub const DEFAULT_SENTINEL: &str = "—";

/// Detail columns that are mostly empty or free text.
pub const DEFAULT_DROPPED_COLUMNS: [&str; 9] = [
    "Reviews",
    "Website",
    "Support url",
    "Support email",
    "Metacritic url",
    "Score rank",
    "Notes",
    "Screenshots",
    "Movies",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// What happens to a price cell holding the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentinelPolicy {
    /// Replace with 0 before imputation; the zero counts toward the median.
    #[default]
    Zero,
    /// Treat as missing so it receives the median.
    Impute,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    /// Files whose name contains this marker are not datasets.
    pub exclusion_marker: String,
    pub top_games_prefix: String,
    pub details_table: String,
    pub reviews_table: String,
    pub missing_sentinel: String,
    pub price_sentinel: SentinelPolicy,
    pub dropped_columns: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/csv"),
            exclusion_marker: "Zone".to_string(),
            top_games_prefix: "games_top".to_string(),
            details_table: "games_details".to_string(),
            reviews_table: "reviews".to_string(),
            missing_sentinel: DEFAULT_SENTINEL.to_string(),
            price_sentinel: SentinelPolicy::default(),
            dropped_columns: DEFAULT_DROPPED_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config; missing fields fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }
}
