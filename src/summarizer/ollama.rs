//! Summarization adapter for a local Ollama runtime.

use super::{SUMMARY_INSTRUCTION, SummarizationRequest, SummarizerClient, SummarizerError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

/// Client issuing non-streaming generate requests to an Ollama runtime.
pub struct OllamaSummarizer {
    http: Client,
    base_url: String,
}

impl OllamaSummarizer {
    /// Build a client for the runtime at `base_url`.
    pub fn new(base_url: String) -> Self {
        let http = Client::builder()
            .user_agent("briefly/summarizer")
            .build()
            .expect("Failed to construct reqwest::Client for summarization");
        Self { http, base_url }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl SummarizerClient for OllamaSummarizer {
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizerError> {
        let payload = json!({
            "model": request.model,
            "prompt": format!("{SUMMARY_INSTRUCTION}\n\n{}", request.text),
            "stream": false,
            "options": {
                // Low temperature keeps summaries close to deterministic.
                "temperature": 0.1,
            }
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizerError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SummarizerError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizerError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: GenerateResponse = response.json().await.map_err(|error| {
            SummarizerError::InvalidResponse(format!("failed to decode Ollama response: {error}"))
        })?;

        if !body.done {
            return Err(SummarizerError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn client_for(server: &MockServer) -> OllamaSummarizer {
        OllamaSummarizer::new(server.base_url())
    }

    fn request() -> SummarizationRequest {
        SummarizationRequest {
            model: "llama3".into(),
            text: "Quarterly revenue grew by 12 percent.".into(),
        }
    }

    #[tokio::test]
    async fn returns_trimmed_summary_on_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/generate")
                    .json_body_partial(r#"{"model": "llama3", "stream": false}"#);
                then.status(200).json_body(json!({
                    "response": "  Revenue grew 12%.  ",
                    "done": true
                }));
            })
            .await;

        let summary = client_for(&server)
            .generate_summary(request())
            .await
            .expect("summary");

        mock.assert();
        assert_eq!(summary, "Revenue grew 12%.");
    }

    #[tokio::test]
    async fn surfaces_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(500).body("boom");
            })
            .await;

        let error = client_for(&server)
            .generate_summary(request())
            .await
            .expect_err("error response");

        assert!(
            matches!(error, SummarizerError::GenerationFailed(message) if message.contains("500"))
        );
    }

    #[tokio::test]
    async fn rejects_incomplete_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200).json_body(json!({
                    "response": "partial",
                    "done": false
                }));
            })
            .await;

        let error = client_for(&server)
            .generate_summary(request())
            .await
            .expect_err("incomplete response");

        assert!(matches!(error, SummarizerError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn missing_endpoint_maps_to_provider_unavailable() {
        let server = MockServer::start_async().await;
        // No mock registered: httpmock answers 404.

        let error = client_for(&server)
            .generate_summary(request())
            .await
            .expect_err("missing endpoint");

        assert!(matches!(error, SummarizerError::ProviderUnavailable(_)));
    }
}
