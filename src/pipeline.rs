use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::completion::{ChatCompletionClient, CompletionError, CompletionService};
use crate::config::Config;
use crate::entities::NormalizedMovieRecord;
use crate::extractor;
use crate::fetcher::{FetchError, FetchOptions, Fetcher};
use crate::normalizer::Normalizer;
use crate::storage::{self, PersistenceError};

/// How many normalized records the summary previews.
pub const PREVIEW_LEN: usize = 5;

#[derive(Debug)]
pub enum RunSummary {
    Completed {
        raw: usize,
        processed: usize,
        fallback_batches: usize,
        preview: Vec<NormalizedMovieRecord>,
    },
    Aborted(AbortReason),
}

#[derive(Debug, Error)]
pub enum AbortReason {
    #[error("completion client unavailable: {0}")]
    ClientUnavailable(#[source] CompletionError),

    #[error("fetch failed ({kind}): {0}", kind = .0.kind())]
    Fetch(#[source] FetchError),

    #[error("no movies scraped")]
    NoRecords,

    #[error("could not save results: {0}")]
    Persistence(#[source] PersistenceError),
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed {
                raw,
                processed,
                fallback_batches,
                preview,
            } => {
                writeln!(f, "Raw movies scraped: {raw}")?;
                writeln!(f, "Movies processed: {processed}")?;
                writeln!(f, "Batches on fallback: {fallback_batches}")?;
                writeln!(f, "First {} processed movies:", preview.len())?;
                for movie in preview {
                    let year = movie.release_year.map_or("?".to_string(), |y| y.to_string());
                    let rating = movie.imdb_rating.map_or("n/a".to_string(), |r| r.to_string());
                    writeln!(f, "  {}. {} ({year}) - Rating: {rating}", movie.rank, movie.title)?;
                }
                Ok(())
            }
            Self::Aborted(reason) => write!(f, "Run aborted: {reason}"),
        }
    }
}

/// Builds the completion client from configuration and runs the pipeline.
pub async fn run_from_config(config: &Config) -> RunSummary {
    let completion = ChatCompletionClient::new(config.llm())
        .map(|client| Arc::new(client) as Arc<dyn CompletionService>);
    run(config, completion).await
}

/// Fetch, extract, normalize and persist one list page.
#[instrument(skip_all, fields(url = config.list_url()))]
pub async fn run(
    config: &Config,
    completion: Result<Arc<dyn CompletionService>, CompletionError>,
) -> RunSummary {
    let service = match completion {
        Ok(service) => service,
        Err(e) => return abort(AbortReason::ClientUnavailable(e)),
    };

    info!("step 1: scraping list page");
    let page = match Fetcher::new(FetchOptions::with_timeout(config.fetch_timeout())) {
        Ok(fetcher) => fetcher.fetch(config.list_url()).await,
        Err(e) => Err(e),
    };
    let page = match page {
        Ok(page) => page,
        Err(e) => return abort(AbortReason::Fetch(e)),
    };

    if let Some(path) = config.debug_html_path() {
        match std::fs::write(path, &page.body) {
            Ok(()) => info!(path = %path.display(), "saved page markup for inspection"),
            Err(e) => warn!(path = %path.display(), error = %e, "could not save page markup"),
        }
    }

    let raw = extractor::extract(&page.body, &page.url_final);
    if raw.is_empty() {
        return abort(AbortReason::NoRecords);
    }
    info!(records = raw.len(), "scraped raw movies");

    info!("step 2: normalizing movies");
    let outcome = Normalizer::new(service)
        .with_batch_size(config.batch_size())
        .with_batch_delay(config.batch_delay())
        .normalize_with_outcome(&raw)
        .await;

    info!("step 3: saving results");
    let saved = storage::write_raw(&config.raw_artifact_path(), &raw)
        .and_then(|()| storage::write_processed(&config.processed_artifact_path(), &outcome.records))
        .and_then(|()| storage::write_processed_csv(&config.processed_csv_path(), &outcome.records));
    if let Err(e) = saved {
        return abort(AbortReason::Persistence(e));
    }

    RunSummary::Completed {
        raw: raw.len(),
        processed: outcome.records.len(),
        fallback_batches: outcome.fallback_batches,
        preview: outcome.records.iter().take(PREVIEW_LEN).cloned().collect(),
    }
}

fn abort(reason: AbortReason) -> RunSummary {
    warn!(%reason, "aborting run");
    RunSummary::Aborted(reason)
}
