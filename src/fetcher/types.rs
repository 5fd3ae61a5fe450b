use reqwest::StatusCode;
use url::Url;

/// A list page after download and charset decoding.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url_final: Url,
    pub status: StatusCode,
    /// Label of the encoding the body was decoded from, e.g. `UTF-8`.
    pub encoding: &'static str,
    pub body: String,
}
