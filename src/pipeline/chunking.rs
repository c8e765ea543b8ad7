//! Greedy grouping of document segments into size-bounded chunks.
//!
//! Chunks partition the document exactly: every segment appears exactly once,
//! in original order. The cumulative character length of a chunk stays within
//! the configured limit, with one exception: a single segment longer than the
//! limit becomes its own oversized chunk rather than being split or dropped.

use super::types::ChunkingError;
use crate::document::Segment;

/// A contiguous, non-empty group of document segments submitted to the
/// summarizer as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    segments: Vec<Segment>,
    chars: usize,
}

impl Chunk {
    /// Segments contained in this chunk, in document order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Cumulative character length across contained segments.
    pub fn char_len(&self) -> usize {
        self.chars
    }

    /// Text handed to the summarizer, one segment per line.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(Segment::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Split `segments` into contiguous chunks whose cumulative character length
/// stays within `limit`.
///
/// Segments accumulate into a running chunk; when adding the next segment
/// would push the running total past the limit, the current chunk is closed
/// and a new one opened. An empty input yields no chunks; a limit smaller
/// than every segment yields one chunk per segment.
pub fn chunk_segments(segments: &[Segment], limit: usize) -> Result<Vec<Chunk>, ChunkingError> {
    if limit == 0 {
        return Err(ChunkingError::InvalidLimit);
    }

    let mut chunks = Vec::new();
    let mut current: Vec<Segment> = Vec::new();
    let mut running = 0usize;

    for segment in segments {
        if !current.is_empty() && running + segment.char_len() > limit {
            chunks.push(Chunk {
                segments: std::mem::take(&mut current),
                chars: running,
            });
            running = 0;
        }
        running += segment.char_len();
        current.push(segment.clone());
    }

    if !current.is_empty() {
        chunks.push(Chunk {
            segments: current,
            chars: running,
        });
    }

    Ok(chunks)
}
