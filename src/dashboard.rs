//! Aggregate views over processed records: the filters, rating histogram,
//! top-rated table and genre breakdown the dashboard shows.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Write};

use crate::entities::NormalizedMovieRecord;

pub const HISTOGRAM_BINS: usize = 20;
pub const DEFAULT_TOP_N: usize = 106;

#[derive(Debug, Clone, Default)]
pub struct Filter {
    /// Records without a rating never pass a minimum. The CLI always sets
    /// one (0.0 by default), so unrated movies only show with `None`.
    pub min_rating: Option<f64>,
    /// Keep records having any of these genres; empty keeps all.
    pub genres: Vec<String>,
}

impl Filter {
    pub fn matches(&self, record: &NormalizedMovieRecord) -> bool {
        let rating_ok = match self.min_rating {
            Some(min) => record.imdb_rating.is_some_and(|r| r >= min),
            None => true,
        };
        let genre_ok =
            self.genres.is_empty() || record.genres.iter().any(|g| self.genres.contains(g));
        rating_ok && genre_ok
    }

    pub fn apply<'a>(&self, records: &'a [NormalizedMovieRecord]) -> Vec<&'a NormalizedMovieRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Sorted, de-duplicated genres across all records.
pub fn all_genres(records: &[NormalizedMovieRecord]) -> Vec<String> {
    records
        .iter()
        .flat_map(|r| r.genres.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Equal-width bins spanning the observed rating range; unrated records
/// are left out.
pub fn rating_histogram(records: &[&NormalizedMovieRecord], bins: usize) -> Vec<HistogramBin> {
    let ratings: Vec<f64> = records.iter().filter_map(|r| r.imdb_rating).collect();
    let (Some(min), Some(max)) = (
        ratings.iter().copied().reduce(f64::min),
        ratings.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };

    let bins = bins.max(1);
    let width = if max > min { (max - min) / bins as f64 } else { 1.0 };
    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for rating in ratings {
        let index = (((rating - min) / width) as usize).min(bins - 1);
        histogram[index].count += 1;
    }
    histogram
}

/// Highest rated first; ties keep list order. Unrated records sort last.
pub fn top_rated<'a>(
    records: &[&'a NormalizedMovieRecord],
    n: usize,
) -> Vec<&'a NormalizedMovieRecord> {
    let mut rated: Vec<&NormalizedMovieRecord> =
        records.iter().copied().filter(|r| r.imdb_rating.is_some()).collect();
    rated.sort_by(|a, b| b.imdb_rating.partial_cmp(&a.imdb_rating).unwrap_or(std::cmp::Ordering::Equal));
    rated.truncate(n);
    rated
}

/// Count per genre, most common first, then alphabetical.
pub fn genre_counts(records: &[&NormalizedMovieRecord]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for genre in records.iter().flat_map(|r| r.genres.iter()) {
        *counts.entry(genre.as_str()).or_default() += 1;
    }
    let mut counts: Vec<(String, usize)> =
        counts.into_iter().map(|(g, c)| (g.to_string(), c)).collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Plain-text rendering of every view.
pub fn render<W: Write>(
    out: &mut W,
    records: &[NormalizedMovieRecord],
    filter: &Filter,
    top_n: usize,
) -> fmt::Result {
    let filtered = filter.apply(records);

    writeln!(out, "Movies: {} of {} match", filtered.len(), records.len())?;
    writeln!(out, "Genres available: {}", all_genres(records).join(", "))?;

    writeln!(out, "\nRatings distribution")?;
    for bin in rating_histogram(&filtered, HISTOGRAM_BINS) {
        writeln!(
            out,
            "  {:>5.2} - {:>5.2} | {:<3} {}",
            bin.lower,
            bin.upper,
            bin.count,
            "#".repeat(bin.count)
        )?;
    }

    writeln!(out, "\nTop rated movies")?;
    for record in top_rated(&filtered, top_n) {
        writeln!(
            out,
            "  {:>4.1}  {}  [{}]",
            record.imdb_rating.unwrap_or_default(),
            record.title,
            record.genres.join(", ")
        )?;
    }

    writeln!(out, "\nMovies by genre")?;
    for (genre, count) in genre_counts(&filtered) {
        writeln!(out, "  {count:>4}  {genre}")?;
    }
    Ok(())
}
