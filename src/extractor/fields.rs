use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;
use url::Url;

use crate::entities::{NOT_AVAILABLE, RawMovieRecord};
use crate::extractor::model::{
    ELLIPSIS_TITLE, ExtractionError, TITLE_LINK_SELECTOR, is_title_anchor, raw_text, visible_text,
};

static YEAR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((\d{4})\)").unwrap());

static RUNTIME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+h\s*\d*min|\d+\s*min)").unwrap());

// Dedicated rating class first, then anything whose class mentions rating.
static RATING_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ["span.ipl-rating-star__rating", r#"span[class*="rating"]"#, r#"div[class*="rating"]"#]
        .into_iter()
        .map(|css| Selector::parse(css).unwrap())
        .collect()
});

static GENRE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.genre").unwrap());

/// Builds one raw record from a container. `Ok(None)` means the container
/// had no usable title and is skipped.
pub fn extract_item(
    container: ElementRef<'_>,
    rank: u32,
    base: &Url,
) -> Result<Option<RawMovieRecord>, ExtractionError> {
    let (title, url, block) = if is_title_anchor(&container) {
        (
            visible_text(&container),
            Some(resolve_href(&container, base)?),
            enclosing_block(container),
        )
    } else if let Some(link) = container.select(&TITLE_LINK_SELECTOR).next() {
        (visible_text(&link), Some(resolve_href(&link, base)?), Some(container))
    } else {
        (visible_text(&container), None, Some(container))
    };

    if title.is_empty() || title == ELLIPSIS_TITLE {
        return Ok(None);
    }

    let mut record = RawMovieRecord::new(title, rank);
    if let Some(url) = url {
        record.raw_url = url;
    }
    if let Some(year) = find_year(&raw_text(&container)) {
        record.raw_year = year;
    }
    if let Some(rating) = find_rating(&container) {
        record.raw_rating = rating;
    }
    if let Some(block) = block {
        if let Some(runtime) = find_runtime(&raw_text(&block)) {
            record.raw_runtime = runtime;
        }
        if let Some(genre) = find_genre(&block) {
            record.raw_genre = genre;
        }
    }

    Ok(Some(record))
}

fn resolve_href(anchor: &ElementRef<'_>, base: &Url) -> Result<String, ExtractionError> {
    let href = anchor.value().attr("href").ok_or(ExtractionError::MissingHref)?;
    base.join(href)
        .map(String::from)
        .map_err(|source| ExtractionError::BadUrl {
            href: href.to_string(),
            source,
        })
}

/// Nearest `div` or `li` around a bare title link.
fn enclosing_block(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| matches!(el.value().name(), "div" | "li"))
}

pub fn find_year(text: &str) -> Option<String> {
    YEAR_REGEX
        .captures(text)
        .map(|caps| caps[1].to_string())
}

pub fn find_runtime(text: &str) -> Option<String> {
    RUNTIME_REGEX
        .captures(text)
        .map(|caps| caps[1].to_string())
}

fn find_rating(container: &ElementRef<'_>) -> Option<String> {
    RATING_SELECTORS
        .iter()
        .find_map(|selector| container.select(selector).next())
        .map(|el| visible_text(&el))
        .filter(|text| !text.is_empty() && text != NOT_AVAILABLE)
}

fn find_genre(block: &ElementRef<'_>) -> Option<String> {
    block
        .select(&GENRE_SELECTOR)
        .next()
        .map(|el| visible_text(&el))
        .filter(|text| !text.is_empty())
}
