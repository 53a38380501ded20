//! Data module - CSV loading, cleaning and merging

pub mod coerce;
pub mod schema;

mod catalog;
mod loader;
mod top_games;

pub use catalog::{CatalogMerger, MergeError};
pub use loader::{LoaderError, TableLoader, Tables};
pub use top_games::{parse_year_suffix, ConsolidatedTopGames, TopGame, TopGamesNormalizer};
