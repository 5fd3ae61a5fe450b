use serde::{Deserialize, Serialize};

/// Placeholder used for any raw field the scraper could not resolve.
pub const NOT_AVAILABLE: &str = "N/A";

/// --- Scraped ---

/// One list entry exactly as scraped, before any cleanup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMovieRecord {
    pub raw_title: String,
    pub raw_year: String,
    pub raw_rating: String,
    pub raw_runtime: String,
    pub raw_genre: String,
    pub raw_description: String,
    pub raw_url: String,
    pub raw_rank: u32,
}

impl RawMovieRecord {
    /// A record with only a title and rank; every other field unresolved.
    pub fn new(raw_title: impl Into<String>, raw_rank: u32) -> Self {
        Self {
            raw_title: raw_title.into(),
            raw_year: NOT_AVAILABLE.to_string(),
            raw_rating: NOT_AVAILABLE.to_string(),
            raw_runtime: NOT_AVAILABLE.to_string(),
            raw_genre: NOT_AVAILABLE.to_string(),
            raw_description: NOT_AVAILABLE.to_string(),
            raw_url: NOT_AVAILABLE.to_string(),
            raw_rank,
        }
    }
}

/// --- Normalized ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMovieRecord {
    pub rank: u32,
    pub title: String,
    pub release_year: Option<i32>,
    pub imdb_rating: Option<f64>,
    pub runtime: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub imdb_url: Option<String>,
}

/// Maps the scraper placeholder (and blank text) to `None`.
pub fn available(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == NOT_AVAILABLE {
        None
    } else {
        Some(trimmed)
    }
}
