use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use cagematch::{
    config::Config,
    dashboard::{self, Filter},
    loader,
    pipeline::{self, RunSummary},
    repositories::PgMovieStore,
    storage, telemetry,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "cagematch", about = "Scrape, clean and load a movie list")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scrape the list page, normalize it and write the artifacts.
    Scrape {
        /// Overrides LIST_URL.
        #[arg(long)]
        url: Option<String>,
        /// Overrides OUTPUT_DIR.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Replace the movies table with the processed artifact.
    Load {
        /// Defaults to the processed artifact in OUTPUT_DIR.
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Print the dashboard views for the processed artifact.
    Stats {
        #[arg(long)]
        input: Option<PathBuf>,
        /// Unrated movies never pass, even at 0.0.
        #[arg(long, default_value_t = 0.0)]
        min_rating: f64,
        /// Keep movies having any of these genres.
        #[arg(long = "genre")]
        genres: Vec<String>,
        #[arg(long, default_value_t = dashboard::DEFAULT_TOP_N)]
        top: usize,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    telemetry::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Scrape { url, output_dir } => {
            let mut config = config;
            if let Some(url) = url {
                config = config.with_list_url(url);
            }
            if let Some(dir) = output_dir {
                config = config.with_output_dir(dir);
            }
            scrape(&config).await
        }
        Command::Load { input } => {
            let input = input.unwrap_or_else(|| config.processed_artifact_path());
            load(&config, &input).await
        }
        Command::Stats {
            input,
            min_rating,
            genres,
            top,
        } => {
            let input = input.unwrap_or_else(|| config.processed_artifact_path());
            let records = storage::read_processed(&input)?;
            let filter = Filter {
                min_rating: Some(min_rating),
                genres,
            };
            let mut text = String::new();
            dashboard::render(&mut text, &records, &filter, top)?;
            print!("{text}");
            Ok(())
        }
    }
}

async fn scrape(config: &Config) -> Result<()> {
    let summary = tokio::select! {
        summary = pipeline::run_from_config(config) => summary,
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted by user");
            bail!("interrupted by user");
        }
    };

    print!("{summary}");
    if let RunSummary::Aborted(reason) = summary {
        println!();
        bail!(reason);
    }

    info!(
        raw = %config.raw_artifact_path().display(),
        processed = %config.processed_artifact_path().display(),
        csv = %config.processed_csv_path().display(),
        "artifacts written"
    );
    Ok(())
}

async fn load(config: &Config, input: &std::path::Path) -> Result<()> {
    let records = storage::read_processed(input)?;
    info!(records = records.len(), path = %input.display(), "loaded processed movies");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(config.database_url())
        .await
        .context("connecting to database")?;

    let store = PgMovieStore::new(pool, config.movies_table());
    store.migrate().await?;

    let report = loader::load_movies(&store, &records, Utc::now()).await?;
    println!(
        "Loaded {} movies; table now holds {} rows",
        report.inserted, report.verified
    );
    Ok(())
}
