//! Catalog Pipeline
//! Load -> normalize top games -> merge details and reviews, in one pass.

use crate::config::PipelineConfig;
use crate::data::{
    CatalogMerger, ConsolidatedTopGames, LoaderError, MergeError, TableLoader, Tables,
    TopGamesNormalizer,
};
use crate::data::schema::SchemaError;
use crate::progress::{NullProgress, ProgressEvent, ProgressSink};
use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Merge(#[from] MergeError),
}

pub struct CatalogPipeline {
    config: PipelineConfig,
    loader: TableLoader,
}

impl CatalogPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let loader = TableLoader::new(&config.data_dir, &config.exclusion_marker);
        Self { config, loader }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn loader(&self) -> &TableLoader {
        &self.loader
    }

    /// Every yearly top-games table, cleaned and concatenated.
    pub fn top_games(
        &self,
        progress: &mut dyn ProgressSink,
    ) -> Result<ConsolidatedTopGames, PipelineError> {
        progress.report(ProgressEvent::new(0, "Loading data"));
        let tables = self.loader.load_all()?;
        let games = self.normalize(&tables, progress)?;
        progress.report(ProgressEvent::new(100, "Completed"));
        Ok(games)
    }

    /// The merged catalog table.
    pub fn run(&self, progress: &mut dyn ProgressSink) -> Result<DataFrame, PipelineError> {
        progress.report(ProgressEvent::new(0, "Loading dataframes"));
        let tables = self.loader.load_all()?;
        let details = self.required(&tables, &self.config.details_table)?;
        let reviews = self.required(&tables, &self.config.reviews_table)?;

        let top_games = self.normalize(&tables, &mut NullProgress)?;
        let merged =
            CatalogMerger::new(&self.config).merge(details, reviews, &top_games, progress)?;

        progress.report(ProgressEvent::new(100, "Completed"));
        Ok(merged)
    }

    fn required<'t>(&self, tables: &'t Tables, name: &str) -> Result<&'t DataFrame, LoaderError> {
        tables.get(name).ok_or_else(|| LoaderError::NotFound {
            name: name.to_string(),
            dir: self.loader.dir().to_path_buf(),
        })
    }

    fn normalize(
        &self,
        tables: &Tables,
        progress: &mut dyn ProgressSink,
    ) -> Result<ConsolidatedTopGames, PipelineError> {
        Ok(TopGamesNormalizer::new(&self.config).normalize(tables, progress)?)
    }
}
