use std::collections::HashSet;
use std::fs;
use url::Url;

use scraper::Html;

use crate::extractor::{extract, extract_from_structured_data, extract_primary};

const LIST_URL: &str = "https://www.imdb.com/list/ls086744766/";

fn base() -> Url {
    Url::parse(LIST_URL).unwrap()
}

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{name}"))
        .expect("Failed to read test fixture")
}

#[test]
fn test_extract_lister_page() {
    let records = extract(&fixture("lister.html"), &base());

    // three primary records plus the structured-data entry
    assert_eq!(records.len(), 4);

    let face_off = &records[0];
    assert_eq!(face_off.raw_title, "Face/Off");
    assert_eq!(face_off.raw_year, "1997");
    assert_eq!(face_off.raw_rating, "7.3");
    assert_eq!(face_off.raw_runtime, "138 min");
    assert_eq!(face_off.raw_genre, "Action, Crime, Sci-Fi");
    assert_eq!(
        face_off.raw_url,
        "https://www.imdb.com/title/tt0119094/?ref_=ttls_li_tt"
    );

    // the "..." entry keeps its slot, so ranks skip 2
    let ranks: Vec<u32> = records.iter().map(|r| r.raw_rank).collect();
    assert_eq!(ranks, vec![1, 3, 4, 1]);

    assert_eq!(records[1].raw_title, "Con Air");
    assert_eq!(records[1].raw_rating, "N/A");
    assert_eq!(records[2].raw_title, "Mandy");
    assert_eq!(records[2].raw_runtime, "N/A");
    assert_eq!(records[2].raw_genre, "N/A");
}

#[test]
fn test_primary_ranks_are_unique() {
    for name in ["lister.html", "summary.html"] {
        let document = Html::parse_document(&fixture(name));
        let records = extract_primary(&document, &base());
        let ranks: HashSet<u32> = records.iter().map(|r| r.raw_rank).collect();
        assert_eq!(ranks.len(), records.len(), "duplicate rank in {name}");
        assert!(records.windows(2).all(|w| w[0].raw_rank < w[1].raw_rank));
    }
}

#[test]
fn test_extract_summary_list_page() {
    let records = extract(&fixture("summary.html"), &base());

    // the two-item summary list beats the single test-id item
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].raw_title, "1. Wild at Heart");
    assert_eq!(records[0].raw_year, "1990");
    assert_eq!(records[0].raw_rating, "7.2");
    assert_eq!(records[0].raw_runtime, "2h 5min");
    assert_eq!(records[0].raw_url, "https://www.imdb.com/title/tt0100935/");
    assert_eq!(records[1].raw_title, "2. Raising Arizona");
    assert_eq!(records[1].raw_runtime, "94 min");
}

#[test]
fn test_structured_data_only_page() {
    let markup = fixture("ld_only.html");
    let records = extract(&markup, &base());
    let from_block = extract_from_structured_data(&Html::parse_document(&markup), &base());

    assert_eq!(records, from_block);
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].raw_title, "Leaving Las Vegas");
    assert_eq!(records[0].raw_genre, "Drama, Romance");
    assert_eq!(records[1].raw_rating, "7.6");
    assert_eq!(records[2].raw_runtime, "1h 32min");
}

#[test]
fn test_unreadable_container_is_skipped() {
    let markup = r#"<html><body>
        <div class="lister-item"><h3><a href="http://[bad/title/tt1/">Vampire's Kiss</a></h3></div>
        <div class="lister-item"><h3><a href="/title/tt0096083/">Moonstruck</a> (1987)</h3></div>
    </body></html>"#;

    let records = extract(markup, &base());

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].raw_title, "Moonstruck");
    assert_eq!(records[0].raw_rank, 2);
    assert_eq!(records[0].raw_url, "https://www.imdb.com/title/tt0096083/");
}

#[test]
fn test_garbage_markup_yields_empty() {
    assert!(extract("", &base()).is_empty());
    assert!(extract("<html><head><title>Broken</title><body><p>Unclosed", &base()).is_empty());
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics(html in ".*") {
            let _ = extract(&html, &base());
        }

        #[test]
        fn test_extracted_titles_are_never_placeholders(
            titles in proptest::collection::vec("[ a-zA-Z.]{0,12}", 0..8)
        ) {
            let markup: String = titles
                .iter()
                .enumerate()
                .map(|(i, t)| format!(r#"<div class="lister-item"><a href="/title/tt{i}/">{t}</a></div>"#))
                .collect();
            for record in extract(&markup, &base()) {
                prop_assert!(!record.raw_title.is_empty());
                prop_assert_ne!(record.raw_title.as_str(), "...");
            }
        }
    }
}
