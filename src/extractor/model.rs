use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;
use thiserror::Error;

/// Matches hrefs that point at a title page, e.g. `/title/tt0119094/`.
pub static TITLE_HREF_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/title/tt\d+").unwrap());

pub static TITLE_LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="/title/tt"]"#).unwrap());

/// Title text the list renders for collapsed entries.
pub const ELLIPSIS_TITLE: &str = "...";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("title link has no href")]
    MissingHref,

    #[error("cannot resolve link {href:?}: {source}")]
    BadUrl {
        href: String,
        #[source]
        source: url::ParseError,
    },
}

/// All text below `element`, concatenated without separators.
pub fn raw_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

/// All text below `element` with runs of whitespace collapsed to one space.
pub fn visible_text(element: &ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_title_anchor(element: &ElementRef<'_>) -> bool {
    element.value().name() == "a"
        && element
            .value()
            .attr("href")
            .is_some_and(|href| TITLE_HREF_REGEX.is_match(href))
}
