//! Search Engine - combines the encoder, the similarity index, and the documents

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::embedding::{HtpEncoder, TextEncoder};
use super::index::{Neighbor, SimilarityIndex};
use crate::config::Config;
use crate::core::corpus;
use crate::core::document::Document;
use crate::error::{Result, SearchError};

/// Search result with article metadata and similarity score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub id: usize,
    pub article: String,
    pub date: String,
    pub heading: String,
    pub news_type: String,
    pub similarity: f32,
}

impl From<(&Document, f32)> for SearchResult {
    fn from((doc, similarity): (&Document, f32)) -> Self {
        Self {
            id: doc.id,
            article: doc.article.clone(),
            date: doc.date.clone(),
            heading: doc.heading.clone(),
            news_type: doc.news_type.clone(),
            similarity,
        }
    }
}

/// Index statistics, recorded when the index is built
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub document_count: usize,
    pub dimension: usize,
    pub encoder: String,
    pub built_at: DateTime<Utc>,
    pub duration_ms: u128,
}

/// Semantic search over a fixed set of documents.
///
/// Constructed unbuilt; [`load`](Self::load) encodes and indexes the corpus
/// once. After that the engine is read-only and can be shared across
/// threads behind an `Arc`.
pub struct SearchEngine<E: TextEncoder = HtpEncoder> {
    encoder: E,
    index: SimilarityIndex,
    documents: Vec<Document>,
    stats: Option<IndexStats>,
}

impl SearchEngine<HtpEncoder> {
    /// Load the CSV corpus at `path` and build an index with the default encoder
    pub fn from_csv(path: &Path) -> Result<Self> {
        let documents = corpus::load_csv(path)?;
        let mut engine = Self::new(HtpEncoder::new());
        engine.load(documents)?;
        Ok(engine)
    }
}

impl<E: TextEncoder> SearchEngine<E> {
    pub fn new(encoder: E) -> Self {
        let index = SimilarityIndex::new(encoder.dimension());
        Self {
            encoder,
            index,
            documents: Vec::new(),
            stats: None,
        }
    }

    /// Encode every article in one batch and build the index.
    ///
    /// Document ids must equal their positions. Nothing is kept on failure.
    #[instrument(skip_all, fields(documents = documents.len()))]
    pub fn load(&mut self, documents: Vec<Document>) -> Result<&IndexStats> {
        if self.index.is_built() {
            return Err(SearchError::IndexAlreadyBuilt);
        }
        if documents.is_empty() {
            return Err(SearchError::EmptyCorpus);
        }
        if let Some((pos, doc)) = documents
            .iter()
            .enumerate()
            .find(|(pos, doc)| doc.id != *pos)
        {
            return Err(SearchError::schema(format!(
                "document at position {} has id {}",
                pos, doc.id
            )));
        }

        let start = Instant::now();
        let texts: Vec<&str> = documents.iter().map(|d| d.article.as_str()).collect();
        let vectors = self.encoder.encode_batch(&texts)?;
        if vectors.len() != documents.len() {
            return Err(SearchError::encoding(format!(
                "encoder returned {} vectors for {} texts",
                vectors.len(),
                documents.len()
            )));
        }
        self.index.build(vectors)?;
        self.documents = documents;

        let stats = IndexStats {
            document_count: self.index.len(),
            dimension: self.index.dimension(),
            encoder: self.encoder.name().to_string(),
            built_at: Utc::now(),
            duration_ms: start.elapsed().as_millis(),
        };
        info!(
            documents = stats.document_count,
            dimension = stats.dimension,
            encoder = %stats.encoder,
            duration_ms = stats.duration_ms as u64,
            "Similarity index built"
        );

        Ok(self.stats.insert(stats))
    }

    /// Search for articles similar to `query`, best match first
    #[instrument(skip(self), level = "debug")]
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(SearchError::invalid_query("query text is empty"));
        }
        if top_k == 0 {
            return Err(SearchError::invalid_query("top_k must be at least 1"));
        }
        if !self.index.is_built() {
            return Err(SearchError::IndexNotReady);
        }

        let query_vector = self.encoder.encode(query)?;
        let neighbors = self.index.query(&query_vector, top_k)?;

        let results = assemble_results(&self.documents, neighbors);

        debug!(query, top_k, hits = results.len(), "Search completed");
        Ok(results)
    }

    /// Stored document by id
    pub fn document(&self, id: usize) -> Option<&Document> {
        self.documents.get(id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Index statistics; fails until the corpus is loaded
    pub fn stats(&self) -> Result<&IndexStats> {
        self.stats.as_ref().ok_or(SearchError::IndexNotReady)
    }
}

/// Result count for a request: `None` takes the configured default,
/// non-positive values are rejected, large values are clamped to the
/// configured maximum.
pub fn resolve_top_k(requested: Option<i64>, config: &Config) -> Result<usize> {
    match requested {
        None => Ok(config.default_top_k),
        Some(k) if k <= 0 => Err(SearchError::invalid_query(format!(
            "top_k must be at least 1, got {}",
            k
        ))),
        Some(k) => Ok(usize::try_from(k)
            .unwrap_or(usize::MAX)
            .min(config.max_top_k)),
    }
}

/// Pair neighbors with their documents, keeping rank order.
///
/// A position with no document is logged and dropped.
fn assemble_results(documents: &[Document], neighbors: Vec<Neighbor>) -> Vec<SearchResult> {
    neighbors
        .into_iter()
        .filter_map(|n| match documents.get(n.position) {
            Some(doc) => Some(SearchResult::from((doc, n.similarity()))),
            None => {
                warn!(position = n.position, "Dropping neighbor with no document");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::embedding::EMBEDDING_DIM;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    /// Encoder with hand-picked vectors, for exact distance checks
    struct FixedEncoder {
        pub dimension: usize,
        pub vectors: HashMap<String, Vec<f32>>,
    }

    impl TextEncoder for FixedEncoder {
        fn dimension(&self) -> usize {
            self.dimension
        }

        fn name(&self) -> &str {
            "fixed"
        }

        fn encode(&self, text: &str) -> Result<Vec<f32>> {
            self.vectors
                .get(text)
                .cloned()
                .ok_or_else(|| SearchError::encoding(format!("no vector for {:?}", text)))
        }
    }

    fn abc_engine() -> SearchEngine<FixedEncoder> {
        let vectors = HashMap::from([
            ("article a".to_string(), vec![1.0, 0.0, 0.0]),
            ("article b".to_string(), vec![0.0, 1.0, 0.0]),
            ("article c".to_string(), vec![0.0, 0.0, 1.0]),
            ("near b".to_string(), vec![0.6, 0.8, 0.0]),
        ]);
        let mut engine = SearchEngine::new(FixedEncoder {
            dimension: 3,
            vectors,
        });
        engine
            .load(vec![
                Document::new(0, "article a", "1/1/2015", "A", "business"),
                Document::new(1, "article b", "2/1/2015", "B", "sports"),
                Document::new(2, "article c", "3/1/2015", "C", "business"),
            ])
            .unwrap();
        engine
    }

    fn news_documents() -> Vec<Document> {
        [
            ("Karachi stock exchange gains 300 points as banks rally", "business"),
            ("Pakistan beat Sri Lanka by five wickets in Dambulla", "sports"),
            ("Oil prices drop to six year low on oversupply fears", "business"),
            ("Misbah leads Pakistan cricket team in World Cup opener", "sports"),
            ("Rupee slides against dollar in interbank market", "business"),
        ]
        .iter()
        .enumerate()
        .map(|(i, (text, kind))| Document::new(i, *text, "1/1/2015", format!("H{}", i), *kind))
        .collect()
    }

    fn htp_engine() -> SearchEngine {
        let mut engine = SearchEngine::new(HtpEncoder::new());
        engine.load(news_documents()).unwrap();
        engine
    }

    #[test]
    fn test_assemble_drops_unknown_positions() {
        let documents = abc_engine().documents;
        let neighbors = vec![
            Neighbor { position: 2, distance: 0.5 },
            Neighbor { position: 9, distance: 1.0 },
            Neighbor { position: 0, distance: 1.5 },
        ];

        let results = assemble_results(&documents, neighbors);
        let ids: Vec<usize> = results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 0]);
        assert_eq!(results[0].heading, "C");
        assert!((results[0].similarity - 0.75).abs() < 1e-6);
        assert!((results[1].similarity - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_orthonormal_scenario() {
        let engine = abc_engine();
        let results = engine.search("near b", 2).unwrap();

        let headings: Vec<&str> = results.iter().map(|r| r.heading.as_str()).collect();
        assert_eq!(headings, vec!["B", "A"]);
        assert!((results[0].similarity - 0.8).abs() < 1e-6);
        assert!((results[1].similarity - 0.6).abs() < 1e-6);
        assert_eq!(results[0].id, 1);
        assert_eq!(results[0].news_type, "sports");
    }

    #[test]
    fn test_top_k_larger_than_corpus() {
        let engine = abc_engine();
        let results = engine.search("near b", 50).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[2].heading, "C");
        assert!(results[2].similarity.abs() < 1e-6);
    }

    #[test]
    fn test_invalid_queries() {
        let engine = abc_engine();
        assert!(matches!(
            engine.search("near b", 0),
            Err(SearchError::InvalidQuery(_))
        ));
        assert!(matches!(
            engine.search("   ", 3),
            Err(SearchError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_encoding_failure_at_query_leaves_index_usable() {
        let engine = abc_engine();
        assert!(matches!(
            engine.search("unknown text", 1),
            Err(SearchError::Encoding(_))
        ));
        assert_eq!(engine.search("near b", 1).unwrap()[0].heading, "B");
    }

    #[test]
    fn test_search_before_load() {
        let engine = SearchEngine::new(HtpEncoder::new());
        assert!(matches!(
            engine.search("stocks", 5),
            Err(SearchError::IndexNotReady)
        ));
        assert!(matches!(engine.stats(), Err(SearchError::IndexNotReady)));
    }

    #[test]
    fn test_load_empty() {
        let mut engine = SearchEngine::new(HtpEncoder::new());
        assert!(matches!(engine.load(vec![]), Err(SearchError::EmptyCorpus)));
    }

    #[test]
    fn test_load_twice() {
        let mut engine = htp_engine();
        assert!(matches!(
            engine.load(news_documents()),
            Err(SearchError::IndexAlreadyBuilt)
        ));
        assert_eq!(engine.len(), 5);
    }

    #[test]
    fn test_load_rejects_non_positional_ids() {
        let mut engine = SearchEngine::new(HtpEncoder::new());
        let docs = vec![
            Document::new(0, "a", "", "", ""),
            Document::new(5, "b", "", "", ""),
        ];
        assert!(matches!(engine.load(docs), Err(SearchError::Schema(_))));
        assert!(engine.is_empty());
    }

    #[test]
    fn test_load_failure_keeps_engine_unbuilt() {
        let mut engine = SearchEngine::new(FixedEncoder {
            dimension: 3,
            vectors: HashMap::new(),
        });
        let err = engine
            .load(vec![Document::new(0, "missing", "", "", "")])
            .unwrap_err();
        assert!(matches!(err, SearchError::Encoding(_)));
        assert!(engine.is_empty());
        assert!(engine.stats().is_err());
    }

    #[test]
    fn test_stats() {
        let engine = htp_engine();
        let stats = engine.stats().unwrap();
        assert_eq!(stats.document_count, 5);
        assert_eq!(stats.dimension, EMBEDDING_DIM);
        assert_eq!(stats.encoder, "htp-384");
    }

    #[test]
    fn test_self_similarity_ranks_first() {
        let engine = htp_engine();
        for doc in news_documents() {
            let results = engine.search(&doc.article, 5).unwrap();
            assert_eq!(results[0].id, doc.id);
            assert!((results[0].similarity - 1.0).abs() < 1e-4);
            assert!(results
                .iter()
                .all(|r| r.similarity <= results[0].similarity));
        }
    }

    #[test]
    fn test_search_is_idempotent() {
        let engine = htp_engine();
        let first = engine.search("Pakistan cricket", 3).unwrap();
        let second = engine.search("Pakistan cricket", 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_scores_bounded_and_sorted() {
        let engine = htp_engine();
        let results = engine.search("market prices", 5).unwrap();
        assert_eq!(results.len(), 5);
        for r in &results {
            assert!((-1.0..=1.0).contains(&r.similarity));
        }
        for pair in results.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
    }

    #[test]
    fn test_document_lookup() {
        let engine = htp_engine();
        assert_eq!(engine.document(3).unwrap().heading, "H3");
        assert!(engine.document(99).is_none());
    }

    #[test]
    fn test_resolve_top_k() {
        let config = Config::default();
        assert_eq!(resolve_top_k(None, &config).unwrap(), 5);
        assert_eq!(resolve_top_k(Some(3), &config).unwrap(), 3);
        assert_eq!(resolve_top_k(Some(50), &config).unwrap(), 10);
        assert!(matches!(
            resolve_top_k(Some(0), &config),
            Err(SearchError::InvalidQuery(_))
        ));
        assert!(matches!(
            resolve_top_k(Some(-4), &config),
            Err(SearchError::InvalidQuery(_))
        ));
    }
}
