pub mod fields;
pub mod model;
pub mod strategy;
pub mod structured;

#[cfg(test)]
mod tests;

pub use model::ExtractionError;
pub use structured::extract_from_structured_data;

use scraper::Html;
use tracing::{debug, info, warn};
use url::Url;

use crate::entities::RawMovieRecord;

/// Below this many primary records the structured-data block is consulted too.
pub const MIN_PRIMARY_RECORDS: usize = 50;

/// Scrapes raw movie records from a list page. Never fails: containers that
/// cannot be read are skipped and a hopeless page yields an empty list.
pub fn extract(markup: &str, base: &Url) -> Vec<RawMovieRecord> {
    let document = Html::parse_document(markup);
    let mut records = extract_primary(&document, base);
    info!(records = records.len(), "primary extraction finished");

    if records.len() < MIN_PRIMARY_RECORDS {
        let secondary = extract_from_structured_data(&document, base);
        info!(
            records = secondary.len(),
            "primary extraction below {MIN_PRIMARY_RECORDS}, appended structured data"
        );
        records.extend(secondary);
    }

    records
}

/// Container-based extraction. Ranks are positions among the selected
/// containers, so skipped containers leave gaps.
pub fn extract_primary(document: &Html, base: &Url) -> Vec<RawMovieRecord> {
    let containers = strategy::select_containers(document);
    debug!(containers = containers.len(), "selected containers");

    containers
        .into_iter()
        .zip(1u32..)
        .filter_map(|(container, rank)| match fields::extract_item(container, rank, base) {
            Ok(Some(record)) => Some(record),
            Ok(None) => {
                debug!(rank, "container has no usable title, skipping");
                None
            }
            Err(e) => {
                warn!(rank, error = %e, "failed to read container, skipping");
                None
            }
        })
        .collect()
}
