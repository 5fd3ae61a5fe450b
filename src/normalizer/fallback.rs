use regex::Regex;
use std::sync::LazyLock;

use crate::entities::{NormalizedMovieRecord, RawMovieRecord, available};

static YEAR_DIGITS_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").unwrap());

/// Builds a normalized record from raw fields alone. Titles are kept as
/// scraped, list numbering included.
pub fn fallback_record(raw: &RawMovieRecord) -> NormalizedMovieRecord {
    NormalizedMovieRecord {
        rank: raw.raw_rank,
        title: raw.raw_title.clone(),
        release_year: available(&raw.raw_year).and_then(parse_year),
        imdb_rating: available(&raw.raw_rating).and_then(parse_rating),
        runtime: available(&raw.raw_runtime).map(str::to_string),
        genres: available(&raw.raw_genre)
            .map(|genre| vec![genre.to_string()])
            .unwrap_or_default(),
        imdb_url: available(&raw.raw_url).map(str::to_string),
    }
}

fn parse_year(text: &str) -> Option<i32> {
    YEAR_DIGITS_REGEX.find(text)?.as_str().parse().ok()
}

fn parse_rating(text: &str) -> Option<f64> {
    text.parse::<f64>()
        .ok()
        .filter(|rating| rating.is_finite() && (0.0..=10.0).contains(rating))
}
