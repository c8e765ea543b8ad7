//! Document model and loading.
//!
//! A document reference is a URL pointing at a `.pdf` or `.csv` file. The
//! loader validates the extension before any network traffic, downloads the
//! file, and parses it into an ordered sequence of text segments: one per
//! page with extractable text for PDF, one per record for CSV.

mod loader;

pub use loader::{DocumentLoader, DocumentSource, FileType};

use thiserror::Error;

/// Errors raised while resolving a document reference into segments.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Reference could not be parsed as a URL.
    #[error("invalid document url: {0}")]
    InvalidUrl(String),
    /// Extension is not one of the supported input types.
    #[error("unsupported file type: {extension}")]
    UnsupportedFileType {
        /// Extension found on the URL path, or `(none)`.
        extension: String,
    },
    /// Download failed before a response was received.
    #[error("failed to fetch document: {0}")]
    Fetch(String),
    /// Download returned a non-success status.
    #[error("failed to fetch document: upstream returned {status}")]
    UpstreamStatus {
        /// HTTP status reported by the upstream host.
        status: reqwest::StatusCode,
    },
    /// PDF contents could not be parsed.
    #[error("failed to parse PDF: {0}")]
    Pdf(String),
    /// CSV contents could not be parsed.
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    /// I/O failure while staging a downloaded file.
    #[error("failed to stage downloaded file: {0}")]
    Io(#[from] std::io::Error),
}

/// One contiguous piece of a document's text, with a cached character length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    text: String,
    chars: usize,
}

impl Segment {
    /// Build a segment, computing its character length once.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let chars = text.chars().count();
        Self { text, chars }
    }

    /// Segment text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Character length of the segment text.
    pub fn char_len(&self) -> usize {
        self.chars
    }
}

/// Ordered sequence of segments produced by the loader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    segments: Vec<Segment>,
}

impl Document {
    /// Wrap an ordered list of segments.
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Segments in original order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the document carries no segments at all.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
