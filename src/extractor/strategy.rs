use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

use crate::extractor::model::{TITLE_HREF_REGEX, TITLE_LINK_SELECTOR, visible_text};

/// One way of locating per-movie containers in a list page.
#[derive(Debug)]
pub struct ContainerStrategy {
    pub name: &'static str,
    selector: Selector,
}

impl ContainerStrategy {
    fn new(name: &'static str, css: &str) -> Self {
        Self {
            name,
            selector: Selector::parse(css).unwrap(),
        }
    }

    pub fn candidates<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        document.select(&self.selector).collect()
    }
}

/// Tried in priority order; earlier entries win ties.
pub static CONTAINER_STRATEGIES: LazyLock<Vec<ContainerStrategy>> = LazyLock::new(|| {
    vec![
        ContainerStrategy::new("lister-item", "div.lister-item"),
        ContainerStrategy::new("summary-item", "li.ipc-metadata-list-summary-item"),
        ContainerStrategy::new("test-id", r#"div[data-testid="list-item"]"#),
        ContainerStrategy::new("heading-link", r#"h3 a[href*="/title/tt"]"#),
    ]
});

/// Anchors shorter than this are icons or "..." stubs, not titles.
const MIN_ANCHOR_TITLE_CHARS: usize = 3;

/// Picks the strategy with the most candidates. If none matches anything,
/// falls back to every distinct title link on the page.
pub fn select_containers(document: &Html) -> Vec<ElementRef<'_>> {
    let mut best: Vec<ElementRef<'_>> = Vec::new();

    for strategy in CONTAINER_STRATEGIES.iter() {
        let found = strategy.candidates(document);
        debug!(strategy = strategy.name, found = found.len(), "container strategy");
        if found.len() > best.len() {
            best = found;
        }
    }

    if best.is_empty() {
        best = distinct_title_links(document);
        debug!(found = best.len(), "fell back to distinct title links");
    }

    best
}

fn distinct_title_links(document: &Html) -> Vec<ElementRef<'_>> {
    let mut seen = HashSet::new();

    document
        .select(&TITLE_LINK_SELECTOR)
        .filter(|a| {
            a.value()
                .attr("href")
                .is_some_and(|href| TITLE_HREF_REGEX.is_match(href))
        })
        .filter(|a| {
            let title = visible_text(a);
            title.chars().count() >= MIN_ANCHOR_TITLE_CHARS && seen.insert(title)
        })
        .collect()
}
