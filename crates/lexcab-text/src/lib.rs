//! lexcab-text
//!
//! Inverted index over case-law records and case documents: tantivy-based
//! text analysis, BM25 scoring with field boosts, a JSON artifact persisted
//! atomically, and a search service that rebuilds the artifact when it cannot
//! be loaded.

pub mod tantivy_utils;
pub mod index;
pub mod query;
pub mod search;
pub mod provider;
pub mod builder;
pub mod service;

pub use builder::IndexBuilder;
pub use index::{Field, SearchIndex};
pub use provider::{FileIndexProvider, IndexProvider, MemoryIndexProvider};
pub use search::Hit;
pub use service::{LoadOutcome, SearchService};
