pub mod errors;
pub mod fallback;
pub mod prompt;
pub mod response;

pub use errors::NormalizationError;
pub use fallback::fallback_record;

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::completion::CompletionService;
use crate::entities::{NormalizedMovieRecord, RawMovieRecord};

pub const DEFAULT_BATCH_SIZE: usize = 15;

/// Result of a normalization pass.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOutcome {
    pub records: Vec<NormalizedMovieRecord>,
    pub batches: usize,
    pub fallback_batches: usize,
}

/// Cleans raw records in batches through the completion service, falling
/// back to local rules for any batch the service fails on.
pub struct Normalizer {
    service: Arc<dyn CompletionService>,
    batch_size: usize,
    batch_delay: Duration,
}

impl Normalizer {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self {
            service,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: Duration::from_secs(1),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Pause between successive service requests, for rate limiting.
    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    pub async fn normalize(&self, raw: &[RawMovieRecord]) -> Vec<NormalizedMovieRecord> {
        self.normalize_with_outcome(raw).await.records
    }

    /// Output has one record per input, in input order.
    #[instrument(skip_all, fields(records = raw.len(), batch_size = self.batch_size))]
    pub async fn normalize_with_outcome(&self, raw: &[RawMovieRecord]) -> NormalizeOutcome {
        let mut outcome = NormalizeOutcome::default();
        if raw.is_empty() {
            return outcome;
        }

        let total = raw.len().div_ceil(self.batch_size);
        outcome.records.reserve(raw.len());

        for (index, batch) in raw.chunks(self.batch_size).enumerate() {
            let batch_num = index + 1;
            if index > 0 && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }

            info!(batch = batch_num, total, size = batch.len(), "sending batch");
            match self.normalize_batch(batch).await {
                Ok(records) => {
                    info!(batch = batch_num, records = records.len(), "batch normalized");
                    outcome.records.extend(records);
                }
                Err(e) => {
                    warn!(batch = batch_num, error = %e, "batch failed, using fallback records");
                    outcome.records.extend(batch.iter().map(fallback_record));
                    outcome.fallback_batches += 1;
                }
            }
            outcome.batches += 1;
        }

        outcome
    }

    async fn normalize_batch(
        &self,
        batch: &[RawMovieRecord],
    ) -> Result<Vec<NormalizedMovieRecord>, NormalizationError> {
        let prompt = prompt::build_prompt(batch);
        let reply = self
            .service
            .complete(&prompt, prompt::SYSTEM_INSTRUCTION)
            .await?;
        response::parse_batch(&reply, batch)
    }
}
