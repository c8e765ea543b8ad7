//! Core data types and error definitions for the summarization pipeline.

use crate::document::DocumentError;
use crate::summarizer::SummarizerError;
use thiserror::Error;

/// Errors produced while grouping segments into chunks.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// Configured chunk limit left no room for any segment.
    #[error("chunk character limit must be greater than zero")]
    InvalidLimit,
}

/// Errors emitted by the summarization pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Request carried no usable document reference.
    #[error("missing document reference")]
    MissingReference,
    /// Loading or parsing the referenced document failed.
    #[error("Failed to load document: {0}")]
    Document(#[from] DocumentError),
    /// Chunking step failed to group the document's segments.
    #[error("Failed to chunk document: {0}")]
    Chunking(#[from] ChunkingError),
    /// Summarization provider failed to produce text.
    #[error("Failed to generate summary: {0}")]
    Summarizer(#[from] SummarizerError),
    /// Tokenizer for the single-shot budget failed to load.
    #[error("failed to initialize tokenizer: {0}")]
    Tokenizer(#[source] anyhow::Error),
}

impl PipelineError {
    /// Whether this failure is the caller's fault (bad input) rather than a
    /// downstream fault, deciding between a 400 and a 500 at the boundary.
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::MissingReference => true,
            Self::Document(
                DocumentError::InvalidUrl(_) | DocumentError::UnsupportedFileType { .. },
            ) => true,
            _ => false,
        }
    }
}

/// Result of a single-shot raw-text summarization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSummary {
    /// Generated summary text.
    pub summary: String,
    /// Whether the input was cut down to the token budget before generation.
    pub was_truncated: bool,
}
