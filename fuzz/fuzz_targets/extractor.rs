#![no_main]

use libfuzzer_sys::fuzz_target;
use url::Url;

use cagematch::extractor::extract;
use cagematch::normalizer::fallback_record;

fuzz_target!(|data: &[u8]| {
    // Convert raw bytes to string, handling invalid UTF-8 gracefully
    let html = String::from_utf8_lossy(data);
    let base = Url::parse("https://www.imdb.com/list/ls086744766/").unwrap();

    // Neither extraction nor the local fallback may panic on any page
    for record in extract(&html, &base) {
        assert!(!record.raw_title.is_empty());
        let _ = fallback_record(&record);
    }
});
