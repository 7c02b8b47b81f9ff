//! Deterministic feature-hashing embedder.
//!
//! Each lowercase word token is hashed to a dimension index and a sign; the
//! accumulated vector is L2-normalized. No model, no network: texts sharing
//! vocabulary land close together, which is enough for offline operation and
//! for exercising the storage and retrieval paths in tests.

use anyhow::Result;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::{l2_normalize, EmbeddingProvider};

const MODEL_NAME: &str = "feature-hash-v1";

pub struct HashEmbeddingProvider {
    dimensions: usize,
}

impl HashEmbeddingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn hash_token(token: &str, salt: u8) -> u64 {
        let mut hasher = DefaultHasher::new();
        salt.hash(&mut hasher);
        token.hash(&mut hasher);
        hasher.finish()
    }
}

impl EmbeddingProvider for HashEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();
        let tokens = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
            .filter(|t| !t.is_empty());

        for token in tokens {
            let idx = (Self::hash_token(token, 0) % self.dimensions as u64) as usize;
            let sign = if Self::hash_token(token, 1) % 2 == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign;
        }

        Ok(l2_normalize(&vector))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        MODEL_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::cosine_similarity;

    #[test]
    fn produces_requested_dimensions() {
        let provider = HashEmbeddingProvider::new(64);
        let v = provider.embed("Kafka streaming platform").unwrap();
        assert_eq!(v.len(), 64);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn is_deterministic() {
        let provider = HashEmbeddingProvider::new(64);
        assert_eq!(
            provider.embed("Rust backend engineer").unwrap(),
            provider.embed("Rust backend engineer").unwrap()
        );
    }

    #[test]
    fn shared_vocabulary_is_closer() {
        let provider = HashEmbeddingProvider::new(256);
        let a = provider.embed("kafka streaming backend").unwrap();
        let b = provider.embed("kafka streaming").unwrap();
        let c = provider.embed("watercolor painting").unwrap();
        assert!(cosine_similarity(&a, &b) > cosine_similarity(&a, &c));
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let provider = HashEmbeddingProvider::new(8);
        assert_eq!(provider.embed("   ").unwrap(), vec![0.0; 8]);
    }
}
