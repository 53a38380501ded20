//! Steam Catalog - consolidates scraped yearly top-games snapshots and merges
//! them with game details and review scores into one analysis table.

pub mod config;
pub mod data;
pub mod logging;
pub mod pipeline;
pub mod progress;
pub mod stats;

pub use config::{PipelineConfig, SentinelPolicy};
pub use pipeline::{CatalogPipeline, PipelineError};
pub use progress::{LogProgress, NullProgress, ProgressEvent, ProgressSink};
