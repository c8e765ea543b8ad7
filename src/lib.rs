#![deny(missing_docs)]

//! Core library for the briefly summarization server.

/// HTTP routing, REST handlers, and the WebSocket endpoint.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Document download and parsing into ordered segments.
pub mod document;
/// In-memory registry for deferred summarization jobs.
pub mod jobs;
/// Structured logging and tracing setup.
pub mod logging;
/// Summarization activity counters.
pub mod metrics;
/// Chunking and summary-stitching pipeline.
pub mod pipeline;
/// Summarization provider adapters.
pub mod summarizer;
