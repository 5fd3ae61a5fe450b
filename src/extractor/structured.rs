use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

use crate::entities::RawMovieRecord;
use crate::extractor::model::{ELLIPSIS_TITLE, normalize_whitespace};

static LD_JSON_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

#[derive(Debug, Deserialize)]
struct ItemList {
    #[serde(rename = "itemListElement")]
    item_list_element: Vec<ListItem>,
}

#[derive(Debug, Deserialize)]
struct ListItem {
    #[serde(default)]
    position: Option<Value>,
    #[serde(default)]
    item: Option<Movie>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Movie {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    date_published: Option<String>,
    #[serde(default)]
    aggregate_rating: Option<AggregateRating>,
    #[serde(default)]
    genre: Option<Value>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AggregateRating {
    #[serde(default)]
    rating_value: Option<Value>,
}

/// Reads movies from the page's JSON-LD item list. Any malformed block
/// yields no records at all.
pub fn extract_from_structured_data(document: &Html, base: &Url) -> Vec<RawMovieRecord> {
    let Some(list) = find_item_list(document) else {
        return Vec::new();
    };

    let mut records = Vec::new();
    for entry in list.item_list_element {
        let Some(movie) = entry.item else { continue };
        let Some(title) = movie
            .name
            .as_deref()
            .map(normalize_whitespace)
            .filter(|t| !t.is_empty() && t != ELLIPSIS_TITLE)
        else {
            continue;
        };

        let rank = entry
            .position
            .as_ref()
            .and_then(as_rank)
            .unwrap_or(records.len() as u32 + 1);

        let mut record = RawMovieRecord::new(title, rank);
        if let Some(year) = movie.date_published.filter(|d| !d.trim().is_empty()) {
            record.raw_year = year;
        }
        if let Some(rating) = movie
            .aggregate_rating
            .and_then(|r| r.rating_value)
            .and_then(|v| scalar_text(&v))
        {
            record.raw_rating = rating;
        }
        if let Some(genre) = movie.genre.as_ref().and_then(genre_text) {
            record.raw_genre = genre;
        }
        if let Some(url) = movie.url.and_then(|u| base.join(&u).ok()) {
            record.raw_url = url.into();
        }
        if let Some(duration) = movie.duration.as_deref().and_then(iso_duration_text) {
            record.raw_runtime = duration;
        }
        if let Some(description) = movie.description.filter(|d| !d.trim().is_empty()) {
            record.raw_description = normalize_whitespace(&description);
        }
        records.push(record);
    }

    records
}

fn find_item_list(document: &Html) -> Option<ItemList> {
    for script in document.select(&LD_JSON_SELECTOR) {
        let text: String = script.text().collect();
        let value: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "unparseable ld+json block");
                return None;
            }
        };

        let candidate = match value {
            Value::Array(blocks) => blocks
                .into_iter()
                .find(|b| b.get("itemListElement").is_some()),
            other if other.get("itemListElement").is_some() => Some(other),
            _ => None,
        };

        if let Some(candidate) = candidate {
            return match serde_json::from_value(candidate) {
                Ok(list) => Some(list),
                Err(e) => {
                    debug!(error = %e, "ld+json item list has an unexpected shape");
                    None
                }
            };
        }
    }
    None
}

fn as_rank(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn genre_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Array(items) => {
            let genres: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!genres.is_empty()).then(|| genres.join(", "))
        }
        _ => None,
    }
}

/// `PT2H18M` becomes `2h 18min`, `PT95M` becomes `95 min`.
fn iso_duration_text(duration: &str) -> Option<String> {
    let rest = duration.strip_prefix("PT")?;
    let (hours, rest) = match rest.split_once('H') {
        Some((h, rest)) => (h.parse::<u32>().ok()?, rest),
        None => (0, rest),
    };
    let minutes = match rest.strip_suffix('M') {
        Some(m) if !m.is_empty() => m.parse::<u32>().ok()?,
        _ if rest.is_empty() => 0,
        _ => return None,
    };
    match (hours, minutes) {
        (0, 0) => None,
        (0, m) => Some(format!("{m} min")),
        (h, m) => Some(format!("{h}h {m}min")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.imdb.com/list/ls086744766/").unwrap()
    }

    fn page(ld_json: &str) -> Html {
        Html::parse_document(&format!(
            r#"<html><head><script type="application/ld+json">{ld_json}</script></head><body></body></html>"#
        ))
    }

    #[test]
    fn test_item_list_maps_fields() {
        let html = page(
            r#"{"@type":"ItemList","itemListElement":[
                {"@type":"ListItem","position":3,"item":{"@type":"Movie","name":"Face/Off",
                 "url":"/title/tt0119094/","datePublished":"1997-06-27",
                 "aggregateRating":{"ratingValue":7.3},"genre":["Action","Crime"],"duration":"PT2H18M"}},
                {"@type":"ListItem","item":{"name":"Mandy","genre":"Horror"}}
            ]}"#,
        );
        let records = extract_from_structured_data(&html, &base());

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].raw_rank, 3);
        assert_eq!(records[0].raw_title, "Face/Off");
        assert_eq!(records[0].raw_url, "https://www.imdb.com/title/tt0119094/");
        assert_eq!(records[0].raw_year, "1997-06-27");
        assert_eq!(records[0].raw_rating, "7.3");
        assert_eq!(records[0].raw_genre, "Action, Crime");
        assert_eq!(records[0].raw_runtime, "2h 18min");

        // no position: numbered within the structured sequence
        assert_eq!(records[1].raw_rank, 2);
        assert_eq!(records[1].raw_rating, "N/A");
        assert_eq!(records[1].raw_genre, "Horror");
    }

    #[test]
    fn test_malformed_block_yields_nothing() {
        let html = page(r#"{"itemListElement": [ {"item": "#);
        assert!(extract_from_structured_data(&html, &base()).is_empty());
    }

    #[test]
    fn test_wrong_shape_yields_nothing() {
        let html = page(r#"{"itemListElement": "not a list"}"#);
        assert!(extract_from_structured_data(&html, &base()).is_empty());
    }

    #[test]
    fn test_no_block_yields_nothing() {
        let html = Html::parse_document("<html><body></body></html>");
        assert!(extract_from_structured_data(&html, &base()).is_empty());
    }

    #[test]
    fn test_iso_duration_text() {
        assert_eq!(iso_duration_text("PT1H55M").as_deref(), Some("1h 55min"));
        assert_eq!(iso_duration_text("PT95M").as_deref(), Some("95 min"));
        assert_eq!(iso_duration_text("PT2H").as_deref(), Some("2h 0min"));
        assert_eq!(iso_duration_text("P1D"), None);
    }
}
