use super::{Document, DocumentError, Segment};
use async_trait::async_trait;
use pdf_oxide::converters::ConversionOptions;
use reqwest::Client;
use std::io::Write;
use url::Url;

/// Supported input file types, detected from the URL path extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Portable Document Format; one segment per page with extractable text.
    Pdf,
    /// Comma-separated values; one segment per record.
    Csv,
}

/// Interface implemented by document sources, so the pipeline can be tested
/// without network access.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Resolve a document reference into ordered segments.
    async fn load(&self, url: &str) -> Result<Document, DocumentError>;
}

/// HTTP-backed document source for PDF and CSV references.
pub struct DocumentLoader {
    http: Client,
}

impl DocumentLoader {
    /// Build a loader with its own HTTP client.
    pub fn new() -> Self {
        let http = Client::builder()
            .user_agent("briefly/loader")
            .build()
            .expect("Failed to construct reqwest::Client for document loading");
        Self { http }
    }
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentSource for DocumentLoader {
    async fn load(&self, url: &str) -> Result<Document, DocumentError> {
        // Extension check happens before any network traffic.
        let file_type = detect_file_type(url)?;
        tracing::debug!(url, ?file_type, "Fetching document");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|error| DocumentError::Fetch(error.to_string()))?;
        if !response.status().is_success() {
            return Err(DocumentError::UpstreamStatus {
                status: response.status(),
            });
        }

        match file_type {
            FileType::Pdf => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|error| DocumentError::Fetch(error.to_string()))?;
                // PDF extraction is CPU-bound; keep it off the async workers.
                tokio::task::spawn_blocking(move || parse_pdf(&bytes))
                    .await
                    .map_err(|error| DocumentError::Pdf(format!("parser task failed: {error}")))?
            }
            FileType::Csv => {
                let body = response
                    .text()
                    .await
                    .map_err(|error| DocumentError::Fetch(error.to_string()))?;
                parse_csv(&body)
            }
        }
    }
}

/// Determine the file type from the URL path extension.
///
/// Anything other than `.pdf` or `.csv` is rejected without a fetch attempt.
pub(crate) fn detect_file_type(url: &str) -> Result<FileType, DocumentError> {
    let parsed = Url::parse(url).map_err(|error| DocumentError::InvalidUrl(error.to_string()))?;
    let extension = std::path::Path::new(parsed.path())
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => Ok(FileType::Pdf),
        "csv" => Ok(FileType::Csv),
        "" => Err(DocumentError::UnsupportedFileType {
            extension: "(none)".to_string(),
        }),
        other => Err(DocumentError::UnsupportedFileType {
            extension: other.to_string(),
        }),
    }
}

fn parse_pdf(bytes: &[u8]) -> Result<Document, DocumentError> {
    let mut staged = tempfile::NamedTempFile::new()?;
    staged.write_all(bytes)?;
    staged.flush()?;
    let path = staged
        .path()
        .to_str()
        .ok_or_else(|| DocumentError::Pdf("non-UTF-8 temp path".to_string()))?;

    let mut doc =
        pdf_oxide::PdfDocument::open(path).map_err(|error| DocumentError::Pdf(error.to_string()))?;
    let page_count = doc
        .page_count()
        .map_err(|error| DocumentError::Pdf(error.to_string()))?;
    let options = ConversionOptions {
        include_images: false,
        ..ConversionOptions::default()
    };

    let mut segments = Vec::new();
    for page_index in 0..page_count {
        let text = doc
            .to_markdown(page_index, &options)
            .map_err(|error| DocumentError::Pdf(error.to_string()))?;
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            segments.push(Segment::new(trimmed));
        }
    }

    tracing::debug!(pages = page_count, segments = segments.len(), "Parsed PDF");
    Ok(Document::new(segments))
}

fn parse_csv(body: &str) -> Result<Document, DocumentError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut segments = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.iter().collect::<Vec<_>>().join(" ");
        if !line.trim().is_empty() {
            segments.push(Segment::new(line));
        }
    }

    tracing::debug!(segments = segments.len(), "Parsed CSV");
    Ok(Document::new(segments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};

    #[test]
    fn detects_supported_extensions_case_insensitively() {
        let base = "http://example.org/files";
        assert_eq!(
            detect_file_type(&format!("{base}/report.pdf")).unwrap(),
            FileType::Pdf
        );
        assert_eq!(
            detect_file_type(&format!("{base}/table.CSV")).unwrap(),
            FileType::Csv
        );
    }

    #[test]
    fn rejects_unsupported_extension() {
        let error = detect_file_type("http://example.org/notes.txt").unwrap_err();
        assert!(
            matches!(error, DocumentError::UnsupportedFileType { ref extension } if extension == "txt")
        );
    }

    #[test]
    fn rejects_missing_extension() {
        let error = detect_file_type("http://example.org/notes").unwrap_err();
        assert!(matches!(error, DocumentError::UnsupportedFileType { .. }));
    }

    #[test]
    fn ignores_query_string_when_detecting() {
        assert_eq!(
            detect_file_type("http://example.org/report.pdf?token=abc").unwrap(),
            FileType::Pdf
        );
    }

    #[test]
    fn rejects_unparsable_url() {
        let error = detect_file_type("not a url").unwrap_err();
        assert!(matches!(error, DocumentError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn unsupported_file_type_fails_without_fetch() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).body("should never be requested");
            })
            .await;

        let loader = DocumentLoader::new();
        let error = loader
            .load(&format!("{}/notes.txt", server.base_url()))
            .await
            .unwrap_err();

        assert!(matches!(error, DocumentError::UnsupportedFileType { .. }));
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn loads_csv_records_as_segments() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/table.csv");
                then.status(200)
                    .body("alpha,beta\ngamma,delta\n\n");
            })
            .await;

        let loader = DocumentLoader::new();
        let document = loader
            .load(&format!("{}/table.csv", server.base_url()))
            .await
            .expect("csv document");

        let texts: Vec<&str> = document
            .segments()
            .iter()
            .map(|segment| segment.text())
            .collect();
        assert_eq!(texts, vec!["alpha beta", "gamma delta"]);
    }

    #[tokio::test]
    async fn surfaces_upstream_status_on_fetch_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing.csv");
                then.status(404);
            })
            .await;

        let loader = DocumentLoader::new();
        let error = loader
            .load(&format!("{}/missing.csv", server.base_url()))
            .await
            .unwrap_err();

        assert!(
            matches!(error, DocumentError::UpstreamStatus { status } if status.as_u16() == 404)
        );
        assert!(error.to_string().contains("404"));
    }
}
