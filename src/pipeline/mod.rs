//! Summarization pipeline: chunking, per-chunk generation, and stitching.

pub mod chunking;
mod service;
pub mod types;

pub use chunking::{Chunk, chunk_segments};
pub use service::{SummaryApi, SummaryService};
pub use types::{ChunkingError, PipelineError, TextSummary};
