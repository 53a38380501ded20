//! Table Schema Module
//! Column contracts checked at each pipeline boundary.

use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{kind} table '{table}' is missing column '{column}'")]
    MissingColumn {
        kind: String,
        table: String,
        column: String,
    },
}

/// Named columns a table must carry.
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub kind: &'static str,
    pub columns: &'static [&'static str],
}

pub mod top_games {
    pub const NAME: &str = "name";
    pub const PRICE: &str = "price";
    pub const RATING: &str = "rating";
    pub const RELEASE_DATE: &str = "release date";
    pub const FOLLOWERS: &str = "followers";
    pub const MAX_PEAK: &str = "max peak";
    pub const YEAR: &str = "year";
}

pub mod details {
    pub const APP_ID: &str = "AppID";
    pub const NAME: &str = "Name";
    pub const RELEASE_DATE: &str = "Release date";
}

pub mod reviews {
    pub const APP_ID: &str = "app_id";
    pub const REVIEW_SCORE: &str = "review_score";
    pub const REVIEW_VOTES: &str = "review_votes";
}

pub mod catalog {
    pub const APP_ID: &str = "app_id";
    pub const PRICE: &str = "price";
}

/// Column order written by the collector.
pub const TOP_GAMES: TableSchema = TableSchema {
    kind: "top games",
    columns: &[
        top_games::NAME,
        top_games::PRICE,
        top_games::RATING,
        top_games::RELEASE_DATE,
        top_games::FOLLOWERS,
        top_games::MAX_PEAK,
    ],
};

pub const GAME_DETAILS: TableSchema = TableSchema {
    kind: "game details",
    columns: &[details::APP_ID, details::NAME, details::RELEASE_DATE],
};

pub const REVIEWS: TableSchema = TableSchema {
    kind: "reviews",
    columns: &[reviews::APP_ID, reviews::REVIEW_SCORE, reviews::REVIEW_VOTES],
};

impl TableSchema {
    /// Fails on the first required column `df` lacks.
    pub fn validate(&self, table: &str, df: &DataFrame) -> Result<(), SchemaError> {
        let present = df.get_column_names();
        for &column in self.columns {
            if !present.iter().any(|c| c.as_str() == column) {
                return Err(SchemaError::MissingColumn {
                    kind: self.kind.to_string(),
                    table: table.to_string(),
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }
}
