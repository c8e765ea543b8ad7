//! Abstractions for generating abstractive summaries.
//!
//! Two providers implement the same contract and are interchangeable through
//! configuration: a local Ollama runtime and the hosted OpenAI API. Both are
//! thin HTTP adapters; neither retries internally, so upstream failures reach
//! the caller as typed errors carrying the upstream message.

mod ollama;
mod openai;

pub use ollama::OllamaSummarizer;
pub use openai::OpenAiSummarizer;

use crate::config::{SummarizerProvider, get_config};
use async_trait::async_trait;
use thiserror::Error;

/// Default Ollama runtime address.
pub(crate) const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Instruction prepended to every request before it reaches a provider.
pub(crate) const SUMMARY_INSTRUCTION: &str =
    "Summarize the following document excerpt in a few concise sentences. \
     Reply with the summary only.";

/// Errors surfaced while attempting summarization.
#[derive(Debug, Error)]
pub enum SummarizerError {
    /// Provider was unreachable or explicitly disabled.
    #[error("summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("failed to generate summary: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Request payload passed to a summarization provider.
#[derive(Debug, Clone)]
pub struct SummarizationRequest {
    /// Model identifier understood by the provider.
    pub model: String,
    /// Text to condense.
    pub text: String,
}

/// Interface implemented by summarization providers.
#[async_trait]
pub trait SummarizerClient: Send + Sync {
    /// Generate a summary for the supplied text.
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizerError>;
}

/// Build the summarizer selected by configuration.
///
/// `Config::from_env` has already enforced that a credential is present when
/// the hosted provider is selected.
pub fn summarizer_from_config() -> Box<dyn SummarizerClient> {
    let config = get_config();
    match config.summarizer_provider {
        SummarizerProvider::Ollama => {
            let base_url = config
                .ollama_url
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
            Box::new(OllamaSummarizer::new(base_url))
        }
        SummarizerProvider::OpenAI => Box::new(OpenAiSummarizer::new(
            config.openai_api_key.clone().unwrap_or_default(),
            config.openai_base_url.clone(),
        )),
    }
}
