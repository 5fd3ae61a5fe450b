use serde::Deserialize;

use crate::entities::{NOT_AVAILABLE, NormalizedMovieRecord, RawMovieRecord, available};
use crate::normalizer::errors::NormalizationError;

/// One element of the service's reply, before validation.
#[derive(Debug, Deserialize)]
struct ServiceRecord {
    rank: u32,
    title: String,
    #[serde(default)]
    release_year: Option<i32>,
    #[serde(default)]
    imdb_rating: Option<f64>,
    #[serde(default)]
    runtime: Option<String>,
    #[serde(default)]
    genres: Option<Vec<String>>,
    #[serde(default)]
    imdb_url: Option<String>,
}

/// Drops markdown code fences the service sometimes wraps its JSON in.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parses a reply for `batch`. The reply must hold exactly one record per
/// input, in input order, each carrying its input's rank.
pub fn parse_batch(
    text: &str,
    batch: &[RawMovieRecord],
) -> Result<Vec<NormalizedMovieRecord>, NormalizationError> {
    let parsed: Vec<ServiceRecord> = serde_json::from_str(&strip_code_fences(text))?;

    if parsed.len() != batch.len() {
        return Err(NormalizationError::LengthMismatch {
            expected: batch.len(),
            actual: parsed.len(),
        });
    }

    parsed
        .into_iter()
        .zip(batch)
        .enumerate()
        .map(|(index, (record, raw))| validate(index, record, raw))
        .collect()
}

fn validate(
    index: usize,
    record: ServiceRecord,
    raw: &RawMovieRecord,
) -> Result<NormalizedMovieRecord, NormalizationError> {
    if record.rank != raw.raw_rank {
        return Err(NormalizationError::RankMismatch {
            index,
            expected: raw.raw_rank,
            actual: record.rank,
        });
    }

    let title = record.title.trim();
    if title.is_empty() || title == NOT_AVAILABLE {
        return Err(NormalizationError::InvalidRecord {
            index,
            reason: "empty title".to_string(),
        });
    }

    if let Some(rating) = record.imdb_rating
        && !(0.0..=10.0).contains(&rating)
    {
        return Err(NormalizationError::InvalidRecord {
            index,
            reason: format!("rating {rating} outside 0-10"),
        });
    }

    Ok(NormalizedMovieRecord {
        rank: record.rank,
        title: title.to_string(),
        release_year: record.release_year,
        imdb_rating: record.imdb_rating,
        runtime: scrub(record.runtime),
        genres: record
            .genres
            .unwrap_or_default()
            .iter()
            .filter_map(|g| available(g).map(str::to_string))
            .collect(),
        imdb_url: scrub(record.imdb_url),
    })
}

/// A stray "N/A" from the service still means "no value".
fn scrub(value: Option<String>) -> Option<String> {
    value.as_deref().and_then(available).map(str::to_string)
}
