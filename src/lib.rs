//! newsim library
//!
//! Semantic similarity search over a fixed corpus of news articles.
//!
//! # Modules
//!
//! - `core`: Corpus documents and CSV loading
//! - `search`: Text encoder, exact similarity index, and search engine
//! - `config`: YAML + environment configuration
//! - `error`: Error taxonomy shared by loading and search
//! - `logging`: tracing subscriber setup

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod search;

// Re-exports for convenience
pub use config::Config;
pub use crate::core::corpus::{load_csv, read_csv, REQUIRED_COLUMNS};
pub use crate::core::document::Document;
pub use error::{Result, SearchError};
pub use search::{
    resolve_top_k, HtpEncoder, IndexStats, SearchEngine, SearchResult, SimilarityIndex,
    TextEncoder, EMBEDDING_DIM,
};
