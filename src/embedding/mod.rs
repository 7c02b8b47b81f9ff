//! Text-to-vector embedding pipeline.
//!
//! Provides the [`EmbeddingProvider`] trait, the validated storage type
//! [`EmbeddingVector`], and two providers created via [`create_provider`]:
//! an OpenAI-compatible HTTP client ([`http`]) and a deterministic
//! feature-hashing embedder ([`hashed`]).

pub mod hashed;
pub mod http;

use anyhow::Result;

use crate::config::EmbeddingConfig;
use crate::error::EngineError;

/// Trait for embedding text into vectors.
///
/// Implementations produce L2-normalized vectors of exactly
/// [`EmbeddingProvider::dimensions`] elements. All methods are synchronous;
/// async callers go through `tokio::task::spawn_blocking`.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Number of dimensions this provider produces.
    fn dimensions(&self) -> usize;

    /// Model identifier recorded alongside stored vectors.
    fn model(&self) -> &str;
}

/// Create an embedding provider from config.
pub fn create_provider(config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "openai" => Ok(Box::new(http::HttpEmbeddingProvider::from_config(config)?)),
        "hash" => Ok(Box::new(hashed::HashEmbeddingProvider::new(config.dimensions))),
        other => anyhow::bail!("unknown embedding provider: {other}. Supported: openai, hash"),
    }
}

/// Embed `text`, converting any failure into `None`.
///
/// An unavailable embedding means "skip this item", never "abort the batch".
pub fn try_embed(provider: &dyn EmbeddingProvider, text: &str) -> Option<Vec<f32>> {
    match provider.embed(text) {
        Ok(vector) => {
            tracing::debug!(dims = vector.len(), model = provider.model(), "embedding generated");
            Some(vector)
        }
        Err(e) => {
            tracing::warn!(error = %e, model = provider.model(), "embedding call failed");
            None
        }
    }
}

/// A vector whose length has been checked against the store's dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    pub fn new(values: Vec<f32>, expected_dim: usize) -> Result<Self, EngineError> {
        if values.len() != expected_dim {
            return Err(EngineError::DimensionMismatch {
                expected: expected_dim,
                actual: values.len(),
            });
        }
        Ok(Self(values))
    }

    pub fn dimensions(&self) -> usize {
        self.0.len()
    }

    /// Raw little-endian bytes in the layout sqlite-vec expects.
    pub fn to_bytes(&self) -> Vec<u8> {
        vector_to_bytes(&self.0)
    }
}

/// Convert an f32 slice to raw bytes for sqlite-vec.
pub fn vector_to_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// L2-normalize a vector. Returns the input unchanged if its norm is zero.
pub fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}

/// Cosine similarity in [-1, 1]; 0 for mismatched lengths or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
