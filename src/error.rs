//! Error taxonomy for corpus loading, index building, and search.

/// Errors produced by the search core and the corpus loader
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Corpus is missing required columns or has inconsistent ids
    #[error("Schema error: {0}")]
    Schema(String),

    /// Encoder failed or produced an unusable vector
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Build was attempted with zero documents
    #[error("Corpus is empty: nothing to index")]
    EmptyCorpus,

    /// Query issued before the index was built
    #[error("Index is not built yet")]
    IndexNotReady,

    /// Build issued on an index that is already built
    #[error("Index is already built")]
    IndexAlreadyBuilt,

    /// Empty query text or non-positive result count
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Bad configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SearchError {
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        Self::Schema(msg.into())
    }

    pub fn encoding<S: Into<String>>(msg: S) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn invalid_query<S: Into<String>>(msg: S) -> Self {
        Self::InvalidQuery(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// True when the caller sent a bad request, as opposed to a server-side failure
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidQuery(_))
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
