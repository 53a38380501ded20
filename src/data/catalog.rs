//! Catalog-Review Merger
//! Joins game details with averaged review scores and top-games prices.

use crate::config::PipelineConfig;
use crate::data::coerce::{self, DETAILS_DATE_FORMATS};
use crate::data::schema::{self, catalog, details, reviews, SchemaError};
use crate::data::top_games::ConsolidatedTopGames;
use crate::progress::{ProgressEvent, ProgressSink};
use polars::prelude::*;
use thiserror::Error;

/// Helper columns of the price join; never present in the output.
const NAME_KEY: &str = "__name_key";
const TOP_NAME: &str = "__top_name";
const TOP_ROW: &str = "__top_row";

#[derive(Error, Debug)]
pub enum MergeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

pub struct CatalogMerger<'a> {
    config: &'a PipelineConfig,
}

impl<'a> CatalogMerger<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Mean `review_score` and `review_votes` per `app_id`, in order of first
    /// appearance. Rows whose id does not parse are ignored.
    pub fn aggregate_reviews(&self, table: &DataFrame) -> Result<DataFrame, MergeError> {
        schema::REVIEWS.validate(&self.config.reviews_table, table)?;

        let aggregated = table
            .clone()
            .lazy()
            .select([
                col(reviews::APP_ID).cast(DataType::Int64),
                col(reviews::REVIEW_SCORE).cast(DataType::Float64),
                col(reviews::REVIEW_VOTES).cast(DataType::Float64),
            ])
            .filter(col(reviews::APP_ID).is_not_null())
            .group_by_stable([col(reviews::APP_ID)])
            .agg([
                col(reviews::REVIEW_SCORE).mean(),
                col(reviews::REVIEW_VOTES).mean(),
            ])
            .collect()?;

        Ok(aggregated)
    }

    /// Build the merged catalog. Only complete rows survive; `price` is null
    /// for games with no top-games entry under the same lower-cased name.
    pub fn merge(
        &self,
        game_details: &DataFrame,
        review_scores: &DataFrame,
        top_games: &ConsolidatedTopGames,
        progress: &mut dyn ProgressSink,
    ) -> Result<DataFrame, MergeError> {
        schema::GAME_DETAILS.validate(&self.config.details_table, game_details)?;

        progress.report(ProgressEvent::new(20, "Merging details and review score"));
        let scores = self.aggregate_reviews(review_scores)?;

        let joined = game_details
            .clone()
            .lazy()
            .rename([details::APP_ID], [catalog::APP_ID], true)
            .with_column(col(catalog::APP_ID).cast(DataType::Int64))
            .join(
                scores.lazy(),
                [col(catalog::APP_ID)],
                [col(reviews::APP_ID)],
                JoinArgs::new(JoinType::Inner),
            )
            .collect()?;
        tracing::debug!(rows = joined.height(), "joined details with review scores");

        progress.report(ProgressEvent::new(30, "Cleaning"));
        let mut cleaned = self.drop_incomplete(&joined)?;

        let release = coerce::string_values(&cleaned, details::RELEASE_DATE)?
            .iter()
            .map(|d| d.as_deref().and_then(|d| coerce::parse_date(d, DETAILS_DATE_FORMATS)))
            .collect::<Vec<_>>();
        cleaned.with_column(coerce::date_column(details::RELEASE_DATE, &release)?)?;

        progress.report(ProgressEvent::new(45, "Merging top games"));
        let merged = self.join_prices(cleaned, top_games)?;

        tracing::info!(
            joined = joined.height(),
            rows = merged.height(),
            priced = merged.height() - merged.column(catalog::PRICE)?.null_count(),
            "merged catalog"
        );
        Ok(merged)
    }

    /// Left join of `price` on lower-cased `Name`. Every matching top-games
    /// row yields an output row, so a game listed in several years repeats;
    /// games without a match keep one row with a null price. Output is
    /// ordered by `app_id`, then by top-games row order.
    fn join_prices(
        &self,
        mut games: DataFrame,
        top_games: &ConsolidatedTopGames,
    ) -> Result<DataFrame, MergeError> {
        let keys: Vec<Option<String>> = coerce::string_values(&games, details::NAME)?
            .into_iter()
            .map(|name| name.map(|n| n.to_lowercase()))
            .collect();
        games.with_column(Column::new(NAME_KEY.into(), keys))?;

        let rows = &top_games.rows;
        let prices = DataFrame::new(vec![
            Column::new(
                TOP_NAME.into(),
                rows.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            ),
            Column::new(
                catalog::PRICE.into(),
                rows.iter().map(|r| r.price).collect::<Vec<_>>(),
            ),
            Column::new(
                TOP_ROW.into(),
                (0..rows.len() as u32).collect::<Vec<_>>(),
            ),
        ])?;

        let joined = games
            .lazy()
            .join(
                prices.lazy(),
                [col(NAME_KEY)],
                [col(TOP_NAME)],
                JoinArgs::new(JoinType::Left),
            )
            .sort(
                [catalog::APP_ID, TOP_ROW],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .collect()?;

        let keep: Vec<Expr> = joined
            .get_column_names()
            .into_iter()
            .filter(|c| ![NAME_KEY, TOP_NAME, TOP_ROW].contains(&c.as_str()))
            .map(|c| col(c.as_str()))
            .collect();
        Ok(joined.lazy().select(keep).collect()?)
    }

    /// Drop the configured low-value columns, then every row with a null.
    fn drop_incomplete(&self, df: &DataFrame) -> Result<DataFrame, MergeError> {
        let dropped = &self.config.dropped_columns;
        let keep: Vec<Expr> = df
            .get_column_names()
            .into_iter()
            .filter(|c| !dropped.iter().any(|d| d == c.as_str()))
            .map(|c| col(c.as_str()))
            .collect();

        let complete = keep
            .iter()
            .cloned()
            .map(|e| e.is_not_null())
            .reduce(|acc, e| acc.and(e));

        let mut lazy = df.clone().lazy().select(keep);
        if let Some(predicate) = complete {
            lazy = lazy.filter(predicate);
        }
        let cleaned = lazy.collect()?;

        tracing::debug!(
            dropped_rows = df.height() - cleaned.height(),
            "dropped incomplete rows"
        );
        Ok(cleaned)
    }
}
