use thiserror::Error;

use crate::completion::CompletionError;

/// Why a batch could not go through the completion service. Always
/// downgraded to the local fallback, never surfaced to the caller.
#[derive(Error, Debug)]
pub enum NormalizationError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("response is not a JSON array of movies: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("expected {expected} records, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("record {index} has rank {actual}, expected {expected}")]
    RankMismatch {
        index: usize,
        expected: u32,
        actual: u32,
    },

    #[error("record {index} is invalid: {reason}")]
    InvalidRecord { index: usize, reason: String },
}
