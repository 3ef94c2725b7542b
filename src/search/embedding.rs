//! Text encoders
//!
//! `TextEncoder` is the seam between the search engine and whatever turns
//! text into vectors. The default `HtpEncoder` implements Harmonic Token
//! Projection: a deterministic, training-free embedding that needs no model
//! file and no network.
//!
//! HTP per token:
//! 1. Read the token's Unicode code points as a base-2^16 integer N
//! 2. For each coprime modulus m_i, take r_i = N mod m_i
//! 3. Project onto the unit circle: [sin(2πr_i/m_i), cos(2πr_i/m_i)]
//!
//! A text embedding is the mean of its token embeddings, L2 normalized.

use lazy_static::lazy_static;
use rayon::prelude::*;
use regex::Regex;
use std::f64::consts::PI;

use crate::error::Result;

/// Embedding dimension (2 * number of coprime moduli)
pub const EMBEDDING_DIM: usize = 384;

const NUM_MODULI: usize = EMBEDDING_DIM / 2;

/// Maximum token length (Unicode code points)
const MAX_TOKEN_LENGTH: usize = 64;

/// First primes, pairwise coprime by construction
static COPRIME_MODULI: &[u64] = &[
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71,
    73, 79, 83, 89, 97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151,
    157, 163, 167, 173, 179, 181, 191, 193, 197, 199, 211, 223, 227, 229, 233,
    239, 241, 251, 257, 263, 269, 271, 277, 281, 283, 293, 307, 311, 313, 317,
    331, 337, 347, 349, 353, 359, 367, 373, 379, 383, 389, 397, 401, 409, 419,
    421, 431, 433, 439, 443, 449, 457, 461, 463, 467, 479, 487, 491, 499, 503,
    509, 521, 523, 541, 547, 557, 563, 569, 571, 577, 587, 593, 599, 601, 607,
    613, 617, 619, 631, 641, 643, 647, 653, 659, 661, 673, 677, 683, 691, 701,
    709, 719, 727, 733, 739, 743, 751, 757, 761, 769, 773, 787, 797, 809, 811,
    821, 823, 827, 829, 839, 853, 857, 859, 863, 877, 881, 883, 887, 907, 911,
    919, 929, 937, 941, 947, 953, 967, 971, 977, 983, 991, 997, 1009, 1013,
    1019, 1021, 1031, 1033, 1039, 1049, 1051, 1061, 1063, 1069, 1087, 1091,
    1093, 1097, 1103, 1109, 1117, 1123, 1129, 1151, 1153, 1163, 1171, 1181,
];

lazy_static! {
    // Runs of letters, marks, or digits in any script
    static ref TOKEN_RE: Regex = Regex::new(r"[\p{L}\p{M}\p{N}]+").unwrap();
}

/// Turns text into fixed-dimension vectors.
///
/// Implementations must be deterministic within a process and must return
/// identical vectors from `encode` and `encode_batch` for the same text.
pub trait TextEncoder: Send + Sync {
    /// Output vector length
    fn dimension(&self) -> usize;

    /// Short identifier reported in index stats
    fn name(&self) -> &str;

    /// Encode one text
    fn encode(&self, text: &str) -> Result<Vec<f32>>;

    /// Encode many texts, one vector per input in input order
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.encode(t)).collect()
    }
}

/// Harmonic Token Projection encoder
pub struct HtpEncoder {
    moduli: Vec<u64>,
}

impl HtpEncoder {
    pub fn new() -> Self {
        Self {
            moduli: COPRIME_MODULI[..NUM_MODULI].to_vec(),
        }
    }

    fn embed_token(&self, token: &str) -> Vec<f64> {
        let n = token_to_integer(token);

        let mut embedding = Vec::with_capacity(EMBEDDING_DIM);
        for &m in &self.moduli {
            let r = n % m;
            let theta = 2.0 * PI * (r as f64) / (m as f64);
            embedding.push(theta.sin());
            embedding.push(theta.cos());
        }

        embedding
    }
}

impl Default for HtpEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEncoder for HtpEncoder {
    fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }

    fn name(&self) -> &str {
        "htp-384"
    }

    /// Texts without any word token map to the zero vector.
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Ok(vec![0.0; EMBEDDING_DIM]);
        }

        let mut sum = vec![0.0f64; EMBEDDING_DIM];
        for token in &tokens {
            for (acc, val) in sum.iter_mut().zip(self.embed_token(token)) {
                *acc += val;
            }
        }

        // Mean pooling, then normalize in f64 before narrowing
        let count = tokens.len() as f64;
        for val in &mut sum {
            *val /= count;
        }
        let norm = sum.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            Ok(sum.iter().map(|x| (x / norm) as f32).collect())
        } else {
            Ok(sum.iter().map(|x| *x as f32).collect())
        }
    }

    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.par_iter().map(|t| self.encode(t)).collect()
    }
}

/// N = Σ u_j * B^(L-j) with B = 2^16, wrapping on overflow
fn token_to_integer(token: &str) -> u64 {
    token
        .chars()
        .take(MAX_TOKEN_LENGTH)
        .fold(0u64, |n, c| n.wrapping_mul(65536).wrapping_add(c as u64))
}

/// Lowercased word tokens
fn tokenize(text: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Scale `vector` to unit length in place. Zero vectors are left unchanged.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for val in vector.iter_mut() {
            *val /= norm;
        }
    }
}
