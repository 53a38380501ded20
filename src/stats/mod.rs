//! Stats module - medians and column summaries

mod calculator;

pub use calculator::{ColumnSummary, StatsCalculator};
