//! Statistics Calculator Module
//! Median for imputation and descriptive summaries of catalog columns.

use polars::prelude::*;
use statrs::statistics::{Data, Median};

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub nulls: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl std::fmt::Display for ColumnSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<14} n={:<7} nulls={:<7} mean={:>10.3} median={:>10.3} min={:>10.3} max={:>10.3}",
            self.column, self.count, self.nulls, self.mean, self.median, self.min, self.max
        )
    }
}

pub struct StatsCalculator;

impl StatsCalculator {
    /// Median of the finite values, `None` when there are none.
    pub fn median(values: &[f64]) -> Option<f64> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }
        Some(Data::new(finite).median())
    }

    /// Summarize a numeric column; `None` if it is missing, non-numeric or all null.
    pub fn summarize(df: &DataFrame, column: &str) -> Option<ColumnSummary> {
        let col = df.column(column).ok()?;
        if !matches!(
            col.dtype(),
            DataType::Float32
                | DataType::Float64
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        ) {
            return None;
        }
        let casted = col.cast(&DataType::Float64).ok()?;
        let values: Vec<f64> = casted
            .f64()
            .ok()?
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .collect();

        if values.is_empty() {
            return None;
        }

        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(ColumnSummary {
            column: column.to_string(),
            count: n,
            nulls: df.height() - n,
            mean,
            median: Self::median(&values)?,
            min,
            max,
        })
    }
}
