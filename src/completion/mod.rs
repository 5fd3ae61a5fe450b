pub mod client;
pub mod errors;

pub use client::ChatCompletionClient;
pub use errors::CompletionError;

use async_trait::async_trait;

/// A text-completion backend: one prompt and one system instruction in,
/// one text blob out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, CompletionError>;
}
