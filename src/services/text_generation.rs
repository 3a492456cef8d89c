use async_trait::async_trait;
use thiserror::Error;

use crate::domain::generation::{GenerationOutcome, SamplingParams};

/// Public generation surface. Deliberately exception-free: every failure
/// mode degrades into [`GenerationOutcome::Degraded`] instead of an error,
/// because generation is an enhancement, not a critical dependency.
#[async_trait]
pub trait TextGenerationService: Send + Sync {
    async fn generate(&self, prompt: &str, params: &SamplingParams) -> GenerationOutcome;

    async fn commit_message(&self, diff: &str, ticket: Option<&str>) -> GenerationOutcome;

    async fn pr_description(
        &self,
        ticket: &str,
        diff: &str,
        template: Option<&str>,
    ) -> GenerationOutcome;
}

/// Internal backend failure. Never escapes [`TextGenerationService`]; the
/// gateway folds it into a degraded outcome.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("backend failed: {0}")]
    Failed(String),
}

/// A raw completion source the gateway can fall back to, e.g. a local
/// model process.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str, params: &SamplingParams)
    -> Result<String, BackendError>;
}
