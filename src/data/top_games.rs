//! Yearly Top-Games Normalizer
//! Folds the per-year `games_top_<year>` snapshots into one typed table.

use crate::config::{PipelineConfig, SentinelPolicy};
use crate::data::coerce::{self, TOP_GAMES_DATE_FORMATS};
use crate::data::loader::Tables;
use crate::data::schema::{self, top_games as cols, SchemaError};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::stats::StatsCalculator;
use chrono::NaiveDate;
use polars::prelude::*;

/// One cleaned row of the consolidated top-games table.
#[derive(Debug, Clone, PartialEq)]
pub struct TopGame {
    /// Collection year, taken from the table name.
    pub year: i32,
    /// Lower-cased, used as the join key.
    pub name: String,
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub release_date: Option<NaiveDate>,
    pub followers: Option<i64>,
    pub max_peak: Option<i64>,
}

/// Every yearly table after cleaning, ordered by year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsolidatedTopGames {
    pub rows: Vec<TopGame>,
    /// Median used to fill missing prices, if any price was present.
    pub price_median: Option<f64>,
}

impl ConsolidatedTopGames {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct years in output order.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.rows.iter().map(|r| r.year).collect();
        years.dedup();
        years
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let rows = &self.rows;
        let dates: Vec<Option<NaiveDate>> = rows.iter().map(|r| r.release_date).collect();

        DataFrame::new(vec![
            Column::new(
                cols::NAME.into(),
                rows.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            ),
            Column::new(
                cols::PRICE.into(),
                rows.iter().map(|r| r.price).collect::<Vec<_>>(),
            ),
            Column::new(
                cols::RATING.into(),
                rows.iter().map(|r| r.rating).collect::<Vec<_>>(),
            ),
            coerce::date_column(cols::RELEASE_DATE, &dates)?,
            Column::new(
                cols::FOLLOWERS.into(),
                rows.iter().map(|r| r.followers).collect::<Vec<_>>(),
            ),
            Column::new(
                cols::MAX_PEAK.into(),
                rows.iter().map(|r| r.max_peak).collect::<Vec<_>>(),
            ),
            Column::new(
                cols::YEAR.into(),
                rows.iter().map(|r| r.year).collect::<Vec<_>>(),
            ),
        ])
    }
}

/// Year suffix of a `<prefix>_<yyyy>` table name.
pub fn parse_year_suffix(table: &str, prefix: &str) -> Option<i32> {
    let suffix = table.strip_prefix(prefix)?.strip_prefix('_')?;
    if suffix.len() != 4 || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// Row as read, before price imputation.
struct StagedRow {
    year: i32,
    name: String,
    price: Option<f64>,
    rating: Option<String>,
    release: Option<String>,
    followers: Option<String>,
    max_peak: Option<String>,
}

pub struct TopGamesNormalizer<'a> {
    config: &'a PipelineConfig,
}

impl<'a> TopGamesNormalizer<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Yearly tables in `tables`, sorted by year.
    pub fn yearly_tables<'t>(&self, tables: &'t Tables) -> Vec<(i32, &'t str, &'t DataFrame)> {
        let mut selected: Vec<(i32, &str, &DataFrame)> = tables
            .iter()
            .filter_map(|(name, df)| {
                parse_year_suffix(name, &self.config.top_games_prefix)
                    .map(|year| (year, name.as_str(), df))
            })
            .collect();
        selected.sort_by_key(|(year, name, _)| (*year, *name));
        selected
    }

    pub fn normalize(
        &self,
        tables: &Tables,
        progress: &mut dyn ProgressSink,
    ) -> Result<ConsolidatedTopGames, SchemaError> {
        progress.report(ProgressEvent::new(20, "Concatenating data"));

        let mut staged = Vec::new();
        let mut dropped = 0usize;
        for (year, name, df) in self.yearly_tables(tables) {
            schema::TOP_GAMES.validate(name, df)?;
            let before = staged.len();
            dropped += self.stage_table(year, name, df, &mut staged)?;
            tracing::debug!(table = name, year, kept = staged.len() - before, "staged yearly table");
        }

        progress.report(ProgressEvent::new(35, "Cleaning"));

        let present: Vec<f64> = staged.iter().filter_map(|r| r.price).collect();
        let price_median = StatsCalculator::median(&present);
        let imputed = staged.iter().filter(|r| r.price.is_none()).count();

        let rows: Vec<TopGame> = staged
            .into_iter()
            .map(|r| TopGame {
                year: r.year,
                name: r.name,
                price: r.price.or(price_median),
                rating: r.rating.as_deref().and_then(coerce::parse_number),
                release_date: r
                    .release
                    .as_deref()
                    .and_then(|d| coerce::parse_date(d, TOP_GAMES_DATE_FORMATS)),
                followers: r.followers.as_deref().and_then(coerce::parse_count),
                max_peak: r.max_peak.as_deref().and_then(coerce::parse_count),
            })
            .collect();

        tracing::info!(
            rows = rows.len(),
            dropped,
            imputed,
            median = ?price_median,
            "consolidated top games"
        );

        Ok(ConsolidatedTopGames { rows, price_median })
    }

    /// Append one table's usable rows; returns how many were dropped.
    fn stage_table(
        &self,
        year: i32,
        table: &str,
        df: &DataFrame,
        out: &mut Vec<StagedRow>,
    ) -> Result<usize, SchemaError> {
        let column = |name: &str| {
            coerce::string_values(df, name).map_err(|_| SchemaError::MissingColumn {
                kind: schema::TOP_GAMES.kind.to_string(),
                table: table.to_string(),
                column: name.to_string(),
            })
        };
        let names = column(cols::NAME)?;
        let prices = column(cols::PRICE)?;
        let ratings = column(cols::RATING)?;
        let releases = column(cols::RELEASE_DATE)?;
        let followers = column(cols::FOLLOWERS)?;
        let peaks = column(cols::MAX_PEAK)?;

        let sentinel = self.config.missing_sentinel.as_str();
        let is_sentinel = |v: &Option<String>| v.as_deref() == Some(sentinel);

        let mut dropped = 0;
        for i in 0..df.height() {
            if is_sentinel(&followers[i]) || is_sentinel(&ratings[i]) {
                dropped += 1;
                continue;
            }

            let price = match prices[i].as_deref() {
                Some(p) if p == sentinel => match self.config.price_sentinel {
                    SentinelPolicy::Zero => Some(0.0),
                    SentinelPolicy::Impute => None,
                },
                Some(p) => coerce::parse_price(p),
                None => None,
            };

            out.push(StagedRow {
                year,
                name: names[i].as_deref().unwrap_or_default().to_lowercase(),
                price,
                rating: ratings[i].clone(),
                release: releases[i].as_ref().map(|d| format!("{} {}", d.trim(), year)),
                followers: followers[i].clone(),
                max_peak: peaks[i].clone(),
            });
        }
        Ok(dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;
    use pretty_assertions::assert_eq;

    fn yearly(rows: &[[&str; 6]]) -> DataFrame {
        let pick = |i: usize| rows.iter().map(|r| r[i]).collect::<Vec<_>>();
        DataFrame::new(
            schema::TOP_GAMES
                .columns
                .iter()
                .enumerate()
                .map(|(i, name)| Column::new((*name).into(), pick(i)))
                .collect(),
        )
        .unwrap()
    }

    fn tables(entries: Vec<(&str, DataFrame)>) -> Tables {
        entries
            .into_iter()
            .map(|(name, df)| (name.to_string(), df))
            .collect()
    }

    #[test]
    fn year_suffix_must_be_four_digits() {
        assert_eq!(parse_year_suffix("games_top_2021", "games_top"), Some(2021));
        assert_eq!(parse_year_suffix("games_top_21", "games_top"), None);
        assert_eq!(parse_year_suffix("games_top_foo1", "games_top"), None);
        assert_eq!(parse_year_suffix("games_details", "games_top"), None);
    }

    #[test]
    fn release_dates_gain_the_table_year() {
        let config = PipelineConfig::default();
        let input = tables(vec![
            ("games_top_2022", yearly(&[["B", "$5", "90", "Jan 2", "10", "1"]])),
            ("games_top_2021", yearly(&[["A", "$5", "90", "Mar 5", "10", "1"]])),
        ]);
        let out = TopGamesNormalizer::new(&config)
            .normalize(&input, &mut NullProgress)
            .unwrap();

        assert_eq!(out.years(), vec![2021, 2022]);
        for row in &out.rows {
            assert_eq!(row.release_date.map(|d| chrono::Datelike::year(&d)), Some(row.year));
        }
        assert_eq!(out.rows[0].release_date, NaiveDate::from_ymd_opt(2021, 3, 5));
    }

    #[test]
    fn sentinel_rows_are_dropped_and_names_lowered() {
        let config = PipelineConfig::default();
        let input = tables(vec![(
            "games_top_2023",
            yearly(&[
                ["Keep Me", "$1", "80", "Feb 1", "100", "5"],
                ["No Followers", "$1", "80", "Feb 1", "—", "5"],
                ["No Rating", "$1", "—", "Feb 1", "100", "5"],
            ]),
        )]);
        let out = TopGamesNormalizer::new(&config)
            .normalize(&input, &mut NullProgress)
            .unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out.rows[0].name, "keep me");
        assert_eq!(out.rows[0].rating, Some(80.0));
        assert_eq!(out.rows[0].followers, Some(100));
    }

    #[test]
    fn sentinel_price_is_zero_and_counts_toward_median() {
        let config = PipelineConfig::default();
        let input = tables(vec![(
            "games_top_2020",
            yearly(&[
                ["a", "$10", "1", "Jan 1", "1", "1"],
                ["b", "$20", "1", "Jan 1", "1", "1"],
                ["c", "—", "1", "Jan 1", "1", "1"],
                ["d", "$30", "1", "Jan 1", "1", "1"],
                ["e", "", "1", "Jan 1", "1", "1"],
            ]),
        )]);
        let out = TopGamesNormalizer::new(&config)
            .normalize(&input, &mut NullProgress)
            .unwrap();

        let prices: Vec<Option<f64>> = out.rows.iter().map(|r| r.price).collect();
        assert_eq!(out.price_median, Some(15.0));
        assert_eq!(
            prices,
            vec![Some(10.0), Some(20.0), Some(0.0), Some(30.0), Some(15.0)]
        );
    }

    #[test]
    fn impute_policy_fills_sentinel_with_median() {
        let config = PipelineConfig {
            price_sentinel: SentinelPolicy::Impute,
            ..PipelineConfig::default()
        };
        let input = tables(vec![(
            "games_top_2020",
            yearly(&[
                ["a", "$10", "1", "Jan 1", "1", "1"],
                ["b", "$20", "1", "Jan 1", "1", "1"],
                ["c", "—", "1", "Jan 1", "1", "1"],
                ["d", "$30", "1", "Jan 1", "1", "1"],
            ]),
        )]);
        let out = TopGamesNormalizer::new(&config)
            .normalize(&input, &mut NullProgress)
            .unwrap();
        assert_eq!(out.rows[2].price, Some(20.0));
    }

    #[test]
    fn bad_numbers_become_null() {
        let config = PipelineConfig::default();
        let input = tables(vec![(
            "games_top_2020",
            yearly(&[["x", "$1", "abc", "someday", "many", "1.5"]]),
        )]);
        let out = TopGamesNormalizer::new(&config)
            .normalize(&input, &mut NullProgress)
            .unwrap();
        let row = &out.rows[0];
        assert_eq!(row.rating, None);
        assert_eq!(row.followers, None);
        assert_eq!(row.max_peak, None);
        assert_eq!(row.release_date, None);
    }

    #[test]
    fn normalizing_twice_is_identical() {
        let config = PipelineConfig::default();
        let input = tables(vec![
            ("games_top_2021", yearly(&[["A", "—", "90", "Mar 5", "10", "1"]])),
            ("games_top_2022", yearly(&[["B", "$7", "91", "Apr 6", "11", "2"]])),
            ("reviews", DataFrame::default()),
        ]);
        let normalizer = TopGamesNormalizer::new(&config);
        let first = normalizer.normalize(&input, &mut NullProgress).unwrap();
        let second = normalizer.normalize(&input, &mut NullProgress).unwrap();
        assert_eq!(first, second);
        assert!(first.to_dataframe().unwrap().equals_missing(&second.to_dataframe().unwrap()));
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let config = PipelineConfig::default();
        let df = DataFrame::new(vec![Column::new("name".into(), ["a"])]).unwrap();
        let input = tables(vec![("games_top_2020", df)]);
        let err = TopGamesNormalizer::new(&config)
            .normalize(&input, &mut NullProgress)
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumn {
                kind: "top games".to_string(),
                table: "games_top_2020".to_string(),
                column: "price".to_string(),
            }
        );
    }

    #[test]
    fn every_year_is_kept_in_the_table() {
        let games = ConsolidatedTopGames {
            rows: vec![
                TopGame {
                    year: 2020,
                    name: "foo".into(),
                    price: Some(10.0),
                    rating: None,
                    release_date: None,
                    followers: None,
                    max_peak: None,
                },
                TopGame {
                    year: 2021,
                    name: "foo".into(),
                    price: Some(12.0),
                    rating: None,
                    release_date: None,
                    followers: None,
                    max_peak: None,
                },
            ],
            price_median: None,
        };
        let df = games.to_dataframe().unwrap();
        assert_eq!(df.height(), 2);
        let prices: Vec<Option<f64>> = df.column("price").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(prices, vec![Some(10.0), Some(12.0)]);
        assert_eq!(df.column("release date").unwrap().dtype(), &DataType::Date);
    }

    #[test]
    fn progress_is_reported() {
        let config = PipelineConfig::default();
        let mut events = Vec::new();
        TopGamesNormalizer::new(&config)
            .normalize(&Tables::new(), &mut events)
            .unwrap();
        let percents: Vec<u8> = events.iter().map(|e| e.percent).collect();
        assert_eq!(percents, vec![20, 35]);
    }
}
