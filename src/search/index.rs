//! Exact in-memory nearest-neighbor index
//!
//! Vectors are stored row-major in one flat buffer. Row `i` is the vector
//! inserted `i`-th, which is also the id of the document it belongs to.
//! Every stored vector and every query is L2 normalized, so
//! `1 - distance / 2` is exactly the cosine similarity.

use std::cmp::Ordering;

use super::embedding::l2_normalize;
use crate::error::{Result, SearchError};

/// A neighbor returned by [`SimilarityIndex::query`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Insertion position (document id)
    pub position: usize,
    /// Squared L2 distance to the query
    pub distance: f32,
}

impl Neighbor {
    pub fn similarity(&self) -> f32 {
        distance_to_similarity(self.distance)
    }
}

/// Cosine similarity from squared L2 distance between unit vectors.
///
/// For |q| = |v| = 1: |q - v|² = 2 - 2cos, hence cos = 1 - d/2.
/// Clamped to [-1, 1]: f32 rounding can push `d` slightly past 0 or 4.
pub fn distance_to_similarity(distance: f32) -> f32 {
    (1.0 - distance / 2.0).clamp(-1.0, 1.0)
}

/// Squared Euclidean distance
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Nearest first, then lower position first
fn rank_order(a: &Neighbor, b: &Neighbor) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then(a.position.cmp(&b.position))
}

enum State {
    Unbuilt,
    Built { vectors: Vec<f32>, len: usize },
}

/// Flat exact similarity index. `Unbuilt` until [`build`](Self::build)
/// succeeds, then `Built` for the rest of its life.
pub struct SimilarityIndex {
    dimension: usize,
    state: State,
}

impl SimilarityIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            state: State::Unbuilt,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn is_built(&self) -> bool {
        matches!(self.state, State::Built { .. })
    }

    /// Number of indexed vectors (0 while unbuilt)
    pub fn len(&self) -> usize {
        match &self.state {
            State::Unbuilt => 0,
            State::Built { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert all vectors in order. On error the index stays unbuilt.
    pub fn build(&mut self, vectors: Vec<Vec<f32>>) -> Result<()> {
        if self.is_built() {
            return Err(SearchError::IndexAlreadyBuilt);
        }
        if vectors.is_empty() {
            return Err(SearchError::EmptyCorpus);
        }

        let len = vectors.len();
        let mut flat = Vec::with_capacity(len * self.dimension);
        for (position, mut vector) in vectors.into_iter().enumerate() {
            self.check_vector(&vector)
                .map_err(|e| SearchError::encoding(format!("document {}: {}", position, e)))?;
            l2_normalize(&mut vector);
            flat.extend_from_slice(&vector);
        }

        self.state = State::Built { vectors: flat, len };
        Ok(())
    }

    /// The `k` nearest vectors in ascending distance. Exhaustive scan.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        let (vectors, len) = match &self.state {
            State::Unbuilt => return Err(SearchError::IndexNotReady),
            State::Built { vectors, len } => (vectors, *len),
        };
        if k == 0 {
            return Err(SearchError::invalid_query("k must be at least 1"));
        }
        self.check_vector(vector)
            .map_err(|e| SearchError::encoding(format!("query: {}", e)))?;

        let mut query = vector.to_vec();
        l2_normalize(&mut query);

        let mut neighbors: Vec<Neighbor> = vectors
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, row)| Neighbor {
                position,
                distance: squared_l2(&query, row),
            })
            .collect();

        let k = k.min(len);
        if k < neighbors.len() {
            neighbors.select_nth_unstable_by(k - 1, rank_order);
            neighbors.truncate(k);
        }
        neighbors.sort_by(rank_order);

        Ok(neighbors)
    }

    fn check_vector(&self, vector: &[f32]) -> std::result::Result<(), String> {
        if vector.len() != self.dimension {
            return Err(format!(
                "expected dimension {}, got {}",
                self.dimension,
                vector.len()
            ));
        }
        if let Some(i) = vector.iter().position(|x| !x.is_finite()) {
            return Err(format!("non-finite value at component {}", i));
        }
        Ok(())
    }
}
