//! Summary service coordinating loading, chunking, generation, and stitching.

use crate::{
    config::get_config,
    document::{DocumentLoader, DocumentSource},
    metrics::{MetricsSnapshot, SummaryMetrics},
    pipeline::{
        chunking::chunk_segments,
        types::{PipelineError, TextSummary},
    },
    summarizer::{self, SummarizationRequest, SummarizerClient, SummarizerError},
};
use async_trait::async_trait;
use std::sync::Arc;
use tiktoken_rs::cl100k_base;

/// Abstraction over the summarization pipeline used by the HTTP and
/// WebSocket surfaces.
#[async_trait]
pub trait SummaryApi: Send + Sync {
    /// Download the referenced document, chunk it, summarize each chunk, and
    /// stitch the parts into one summary.
    async fn summarize_url(&self, url: &str) -> Result<String, PipelineError>;

    /// Summarize raw text in a single shot, truncating to the token budget.
    async fn summarize_text(&self, text: &str) -> Result<TextSummary, PipelineError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

/// Coordinates the full summarization pipeline.
///
/// The service owns long-lived handles to the document source, the
/// summarization provider, and the metrics registry so that every surface
/// (sync, deferred, WebSocket) reuses the same components. Construct it once
/// near process start and share it through an `Arc`.
pub struct SummaryService {
    source: Box<dyn DocumentSource>,
    summarizer: Box<dyn SummarizerClient>,
    metrics: Arc<SummaryMetrics>,
    model: String,
    chunk_char_limit: usize,
    max_input_tokens: usize,
}

impl SummaryService {
    /// Build the service from global configuration.
    pub fn from_config() -> Self {
        let config = get_config();
        Self::new(
            Box::new(DocumentLoader::new()),
            summarizer::summarizer_from_config(),
            config.summarizer_model.clone(),
            config.chunk_char_limit,
            config.max_input_tokens,
        )
    }

    /// Build the service from explicit parts; tests inject stubs here.
    pub fn new(
        source: Box<dyn DocumentSource>,
        summarizer: Box<dyn SummarizerClient>,
        model: String,
        chunk_char_limit: usize,
        max_input_tokens: usize,
    ) -> Self {
        Self {
            source,
            summarizer,
            metrics: Arc::new(SummaryMetrics::new()),
            model,
            chunk_char_limit,
            max_input_tokens,
        }
    }

    async fn summarize_one(&self, text: String) -> Result<String, SummarizerError> {
        self.summarizer
            .generate_summary(SummarizationRequest {
                model: self.model.clone(),
                text,
            })
            .await
    }
}

#[async_trait]
impl SummaryApi for SummaryService {
    async fn summarize_url(&self, url: &str) -> Result<String, PipelineError> {
        tracing::info!(url, "Summarizing referenced document");
        let document = self.source.load(url).await?;
        let chunks = chunk_segments(document.segments(), self.chunk_char_limit)?;
        tracing::debug!(
            segments = document.len(),
            chunks = chunks.len(),
            limit = self.chunk_char_limit,
            "Chunked document"
        );

        // Sequential per chunk; the stitch preserves document order.
        let mut parts = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let part = self.summarize_one(chunk.text()).await?;
            parts.push(part);
        }

        self.metrics.record_document(chunks.len() as u64);
        Ok(parts.join(" "))
    }

    async fn summarize_text(&self, text: &str) -> Result<TextSummary, PipelineError> {
        let (input, was_truncated) = truncate_to_token_budget(text, self.max_input_tokens)?;
        if was_truncated {
            tracing::debug!(budget = self.max_input_tokens, "Truncated single-shot input");
        }
        let summary = self.summarize_one(input).await?;
        self.metrics.record_document(1);
        Ok(TextSummary {
            summary,
            was_truncated,
        })
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Cut `text` down to at most `budget` tokens, reporting whether anything was
/// dropped.
fn truncate_to_token_budget(text: &str, budget: usize) -> Result<(String, bool), PipelineError> {
    let encoder = cl100k_base().map_err(PipelineError::Tokenizer)?;
    let tokens = encoder.encode_ordinary(text);
    if tokens.len() <= budget {
        return Ok((text.to_string(), false));
    }
    let truncated = encoder
        .decode(tokens[..budget].to_vec())
        .map_err(PipelineError::Tokenizer)?;
    Ok((truncated, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, DocumentError, Segment};
    use std::sync::Mutex;

    struct StaticSource {
        document: Document,
    }

    #[async_trait]
    impl DocumentSource for StaticSource {
        async fn load(&self, _url: &str) -> Result<Document, DocumentError> {
            Ok(self.document.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl DocumentSource for FailingSource {
        async fn load(&self, _url: &str) -> Result<Document, DocumentError> {
            Err(DocumentError::UnsupportedFileType {
                extension: "txt".to_string(),
            })
        }
    }

    /// Echoes each request back as `<<text>>` and records the inputs it saw.
    struct EchoSummarizer {
        seen: Mutex<Vec<String>>,
    }

    impl EchoSummarizer {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SummarizerClient for EchoSummarizer {
        async fn generate_summary(
            &self,
            request: SummarizationRequest,
        ) -> Result<String, SummarizerError> {
            self.seen.lock().unwrap().push(request.text.clone());
            Ok(format!("<<{}>>", request.text))
        }
    }

    fn service_with(document: Document, chunk_char_limit: usize) -> SummaryService {
        SummaryService::new(
            Box::new(StaticSource { document }),
            Box::new(EchoSummarizer::new()),
            "test-model".to_string(),
            chunk_char_limit,
            8,
        )
    }

    #[tokio::test]
    async fn stitches_chunk_summaries_in_document_order() {
        let document = Document::new(vec![
            Segment::new("aaaa"),
            Segment::new("bbbb"),
            Segment::new("cccc"),
        ]);
        let service = service_with(document, 9);

        let summary = service
            .summarize_url("http://example.org/doc.csv")
            .await
            .expect("summary");

        assert_eq!(summary, "<<aaaa\nbbbb>> <<cccc>>");
    }

    #[tokio::test]
    async fn empty_document_yields_empty_summary() {
        let service = service_with(Document::default(), 100);
        let summary = service
            .summarize_url("http://example.org/doc.csv")
            .await
            .expect("summary");
        assert_eq!(summary, "");

        let snapshot = service.metrics_snapshot();
        assert_eq!(snapshot.documents_summarized, 1);
        assert_eq!(snapshot.chunks_summarized, 0);
    }

    #[tokio::test]
    async fn records_chunk_counts_in_metrics() {
        let document = Document::new(vec![Segment::new("aaaa"), Segment::new("bbbb")]);
        let service = service_with(document, 4);

        service
            .summarize_url("http://example.org/doc.csv")
            .await
            .expect("summary");

        let snapshot = service.metrics_snapshot();
        assert_eq!(snapshot.documents_summarized, 1);
        assert_eq!(snapshot.chunks_summarized, 2);
        assert_eq!(snapshot.last_chunk_count, Some(2));
    }

    #[tokio::test]
    async fn loader_errors_propagate() {
        let service = SummaryService::new(
            Box::new(FailingSource),
            Box::new(EchoSummarizer::new()),
            "test-model".to_string(),
            100,
            8,
        );

        let error = service
            .summarize_url("http://example.org/doc.txt")
            .await
            .unwrap_err();
        assert!(matches!(error, PipelineError::Document(_)));
        assert!(error.is_input_error());
    }

    #[tokio::test]
    async fn short_text_is_not_truncated() {
        let service = service_with(Document::default(), 100);
        let outcome = service.summarize_text("short input").await.expect("summary");

        assert!(!outcome.was_truncated);
        assert_eq!(outcome.summary, "<<short input>>");
    }

    #[tokio::test]
    async fn long_text_is_truncated_to_budget() {
        let service = service_with(Document::default(), 100);
        let long_input = "word ".repeat(200);

        let outcome = service.summarize_text(&long_input).await.expect("summary");

        assert!(outcome.was_truncated);
        // The summarizer saw a strictly shorter input than the original.
        assert!(outcome.summary.len() < long_input.len());
    }

    #[test]
    fn truncation_respects_token_budget() {
        let long_input = "alpha beta gamma delta ".repeat(50);
        let (kept, was_truncated) = truncate_to_token_budget(&long_input, 10).unwrap();

        assert!(was_truncated);
        let encoder = cl100k_base().unwrap();
        assert!(encoder.encode_ordinary(&kept).len() <= 10);
        assert!(long_input.starts_with(&kept));
    }

    #[test]
    fn truncation_is_identity_within_budget() {
        let (kept, was_truncated) = truncate_to_token_budget("tiny", 100).unwrap();
        assert!(!was_truncated);
        assert_eq!(kept, "tiny");
    }
}
