//! Semantic search core
//!
//! Encoder -> exact similarity index -> search engine.

pub mod embedding;
pub mod engine;
pub mod index;

pub use embedding::{HtpEncoder, TextEncoder, EMBEDDING_DIM};
pub use engine::{resolve_top_k, IndexStats, SearchEngine, SearchResult};
pub use index::{distance_to_similarity, Neighbor, SimilarityIndex};
