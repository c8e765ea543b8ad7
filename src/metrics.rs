use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing summarization activity.
#[derive(Default)]
pub struct SummaryMetrics {
    documents_summarized: AtomicU64,
    chunks_summarized: AtomicU64,
    last_chunk_count: AtomicU64,
}

impl SummaryMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a summarized document and the number of chunks it produced.
    pub fn record_document(&self, chunk_count: u64) {
        self.documents_summarized.fetch_add(1, Ordering::Relaxed);
        self.chunks_summarized
            .fetch_add(chunk_count, Ordering::Relaxed);
        self.last_chunk_count.store(chunk_count, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let documents_summarized = self.documents_summarized.load(Ordering::Relaxed);
        MetricsSnapshot {
            documents_summarized,
            chunks_summarized: self.chunks_summarized.load(Ordering::Relaxed),
            last_chunk_count: (documents_summarized > 0)
                .then(|| self.last_chunk_count.load(Ordering::Relaxed)),
        }
    }
}

/// Immutable view of summarization counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of documents summarized since startup.
    pub documents_summarized: u64,
    /// Total chunk count submitted to the summarizer across all documents.
    pub chunks_summarized: u64,
    /// Chunk count of the most recently summarized document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_chunk_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_documents_and_chunks() {
        let metrics = SummaryMetrics::new();
        metrics.record_document(2);
        metrics.record_document(3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_summarized, 2);
        assert_eq!(snapshot.chunks_summarized, 5);
        assert_eq!(snapshot.last_chunk_count, Some(3));
    }

    #[test]
    fn empty_snapshot_has_no_last_chunk_count() {
        let metrics = SummaryMetrics::new();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_summarized, 0);
        assert_eq!(snapshot.chunks_summarized, 0);
        assert_eq!(snapshot.last_chunk_count, None);
    }
}
