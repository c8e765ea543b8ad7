//! Summarization adapter for the hosted OpenAI chat-completions API.

use super::{SUMMARY_INSTRUCTION, SummarizationRequest, SummarizerClient, SummarizerError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Client issuing chat-completions requests with a config-injected credential.
pub struct OpenAiSummarizer {
    http: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiSummarizer {
    /// Build a client with the given credential and an optional endpoint
    /// override (proxies, tests).
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        let http = Client::builder()
            .user_agent("briefly/summarizer")
            .build()
            .expect("Failed to construct reqwest::Client for summarization");
        Self {
            http,
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl SummarizerClient for OpenAiSummarizer {
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizerError> {
        let payload = json!({
            "model": request.model,
            "messages": [
                { "role": "system", "content": SUMMARY_INSTRUCTION },
                { "role": "user", "content": request.text },
            ],
            "temperature": 0.2,
        });

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizerError::ProviderUnavailable(format!(
                    "failed to reach OpenAI at {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizerError::GenerationFailed(format!(
                "OpenAI returned {status}: {body}"
            )));
        }

        let body: ChatResponse = response.json().await.map_err(|error| {
            SummarizerError::InvalidResponse(format!("failed to decode OpenAI response: {error}"))
        })?;

        let choice = body.choices.into_iter().next().ok_or_else(|| {
            SummarizerError::InvalidResponse("OpenAI response carried no choices".into())
        })?;

        Ok(choice.message.content.trim().to_string())
    }
}
