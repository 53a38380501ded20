//! Best-effort cell coercion. Anything unparseable becomes `None`.

use chrono::NaiveDate;
use polars::prelude::*;

/// Release-date layouts seen in the yearly tables once the year is appended.
pub const TOP_GAMES_DATE_FORMATS: &[&str] =
    &["%b %d %Y", "%d %b %Y", "%B %d %Y", "%d %B %Y", "%Y-%m-%d"];

/// Release-date layouts used by the game-details table.
pub const DETAILS_DATE_FORMATS: &[&str] = &["%b %d, %Y", "%d %b, %Y", "%B %d, %Y", "%Y-%m-%d"];

/// Parse a price such as `CDN$ 1,299.99`, `$19.99` or `Free`.
pub fn parse_price(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("free") {
        return Some(0.0);
    }
    let digits: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a plain number, tolerating `%` and thousands separators.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a whole count; fractional values are rejected.
pub fn parse_count(raw: &str) -> Option<i64> {
    let value = parse_number(raw)?;
    (value.fract() == 0.0 && value.abs() < i64::MAX as f64).then_some(value as i64)
}

/// First format that parses wins. Month-and-year only dates fall on the 1st.
pub fn parse_date(raw: &str, formats: &[&str]) -> Option<NaiveDate> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| NaiveDate::parse_from_str(&format!("1 {text}"), "%d %b %Y").ok())
}

/// Build a Polars `Date` column from optional dates.
pub fn date_column(name: &str, dates: &[Option<NaiveDate>]) -> PolarsResult<Column> {
    // NaiveDate::default() is 1970-01-01
    let epoch = NaiveDate::default();
    let days: Vec<Option<i32>> = dates
        .iter()
        .map(|d| d.map(|d| d.signed_duration_since(epoch).num_days() as i32))
        .collect();
    Column::new(name.into(), days).cast(&DataType::Date)
}

/// Read a column as optional strings, whatever its dtype.
pub fn string_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}
