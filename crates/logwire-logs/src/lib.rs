//! Log processing for logwire
//!
//! This crate provides the bounded log buffer, the category filter view, and
//! the ingestion boundary that turns inbound payloads into log events.

mod buffer;
mod filter;
mod ingest;

pub use buffer::{LevelCounts, LogBuffer};
pub use filter::{FilterView, TextFilter, visible};
pub use ingest::{IngestError, parse_event};

// Re-export types used in our public API
pub use logwire_types::{Capacity, FilterCategory, Level, LogEvent};

/// Shared handle to an immutable, buffered event
pub type ArcLogEvent = std::sync::Arc<LogEvent>;
