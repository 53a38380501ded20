//! Steam Catalog - consolidate scraped Steam CSV snapshots into one catalog.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use steam_catalog::data::schema::{catalog, reviews};
use steam_catalog::logging::{init_tracing, DEFAULT_FILTER};
use steam_catalog::stats::StatsCalculator;
use steam_catalog::{CatalogPipeline, LogProgress, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "steam_catalog", version, about = "Steam catalog consolidation")]
struct Cli {
    /// Directory holding the scraped CSV files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// JSON config file; flags override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Commands {
    /// List every discoverable table with its shape
    Tables,
    /// Consolidate the yearly top-games tables
    TopGames {
        /// Write the table as CSV instead of printing it
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Merge details, reviews and top-games prices
    Catalog {
        /// Write the table as CSV instead of printing it
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing(DEFAULT_FILTER)?;
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    let pipeline = CatalogPipeline::new(config);

    match cli.command {
        Commands::Tables => {
            let tables = pipeline.loader().load_all()?;
            for (name, df) in &tables {
                println!("{:<30} {:>8} rows {:>4} cols", name, df.height(), df.width());
            }
        }
        Commands::TopGames { output } => {
            let games = pipeline.top_games(&mut LogProgress)?;
            let df = games
                .to_dataframe()
                .context("building top-games table")?;
            emit(df, output.as_deref())?;
        }
        Commands::Catalog { output } => {
            let df = pipeline.run(&mut LogProgress)?;
            for column in [catalog::PRICE, reviews::REVIEW_SCORE] {
                if let Some(summary) = StatsCalculator::summarize(&df, column) {
                    println!("{summary}");
                }
            }
            emit(df, output.as_deref())?;
        }
    }

    Ok(())
}

fn emit(mut df: DataFrame, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let mut file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut df)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(rows = df.height(), path = %path.display(), "wrote table");
        }
        None => println!("{df}"),
    }
    Ok(())
}
