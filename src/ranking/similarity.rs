//! Text-to-text similarity in [0, 1], the primitive behind the experience,
//! aspiration and opportunity signals.
//!
//! `lexical` is an overlap coefficient over content words; `embedding`
//! compares provider vectors and caches them for the life of the value, so
//! a request that compares one query against many texts embeds the query
//! once.

use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::embedding::{cosine_similarity, EmbeddingProvider};

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "have", "i", "in",
    "is", "it", "its", "of", "on", "or", "our", "that", "the", "their", "this", "to", "we",
    "was", "were", "will", "with", "who", "you", "your", "need", "needs", "looking", "want",
    "someone", "strong", "experience", "experienced", "good", "team",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityMode {
    Lexical,
    Embedding,
}

impl std::str::FromStr for SimilarityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lexical" => Ok(Self::Lexical),
            "embedding" => Ok(Self::Embedding),
            other => Err(format!(
                "unknown similarity mode: {other}. Supported: lexical, embedding"
            )),
        }
    }
}

pub struct Similarity {
    mode: SimilarityMode,
    provider: Option<Arc<dyn EmbeddingProvider>>,
    cache: Mutex<HashMap<String, Vec<f32>>>,
}

impl Similarity {
    pub fn lexical() -> Self {
        Self {
            mode: SimilarityMode::Lexical,
            provider: None,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn embedding(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            mode: SimilarityMode::Embedding,
            provider: Some(provider),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn new(mode: SimilarityMode, provider: Arc<dyn EmbeddingProvider>) -> Self {
        match mode {
            SimilarityMode::Lexical => Self::lexical(),
            SimilarityMode::Embedding => Self::embedding(provider),
        }
    }

    /// Similarity of two texts in [0, 1]. Blocking in embedding mode.
    ///
    /// Blank input scores 0. Errors only come from the embedding provider.
    pub fn score(&self, a: &str, b: &str) -> Result<f64> {
        if a.trim().is_empty() || b.trim().is_empty() {
            return Ok(0.0);
        }
        match (&self.mode, &self.provider) {
            (SimilarityMode::Embedding, Some(provider)) => {
                let va = self.vector(provider.as_ref(), a)?;
                let vb = self.vector(provider.as_ref(), b)?;
                Ok((cosine_similarity(&va, &vb) as f64).clamp(0.0, 1.0))
            }
            _ => Ok(lexical_similarity(a, b)),
        }
    }

    fn vector(&self, provider: &dyn EmbeddingProvider, text: &str) -> Result<Vec<f32>> {
        if let Some(v) = self.cache.lock().ok().and_then(|c| c.get(text).cloned()) {
            return Ok(v);
        }
        let v = provider.embed(text)?;
        tracing::debug!(dims = v.len(), "similarity embedding");
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(text.to_string(), v.clone());
        }
        Ok(v)
    }
}

/// Lowercase content words of `text` with stop words removed.
pub fn content_words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Overlap coefficient `|A ∩ B| / min(|A|, |B|)` over content words.
pub fn lexical_similarity(a: &str, b: &str) -> f64 {
    let wa = content_words(a);
    let wb = content_words(b);
    let smaller = wa.len().min(wb.len());
    if smaller == 0 {
        return 0.0;
    }
    let shared = wa.intersection(&wb).count();
    shared as f64 / smaller as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::hashed::HashEmbeddingProvider;

    #[test]
    fn lexical_overlap() {
        assert_eq!(lexical_similarity("Kafka streaming", "streaming with Kafka"), 1.0);
        assert_eq!(lexical_similarity("Kafka streaming", "React frontend"), 0.0);
        let half = lexical_similarity("Kafka streaming", "Kafka dashboards");
        assert!((half - 0.5).abs() < 1e-12);
    }

    #[test]
    fn stop_words_do_not_count() {
        assert_eq!(lexical_similarity("the team", "the team"), 0.0);
        assert_eq!(lexical_similarity("", "Kafka"), 0.0);
    }

    #[test]
    fn embedding_mode_is_bounded_and_reflexive() {
        let provider: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbeddingProvider::new(64));
        let sim = Similarity::embedding(provider);
        let same = sim.score("event streaming with kafka", "event streaming with kafka").unwrap();
        assert!((same - 1.0).abs() < 1e-5);
        let other = sim.score("event streaming with kafka", "watercolor painting").unwrap();
        assert!((0.0..=1.0).contains(&other));
        assert_eq!(sim.score("  ", "kafka").unwrap(), 0.0);
    }

    #[test]
    fn mode_parses() {
        assert_eq!("lexical".parse::<SimilarityMode>().unwrap(), SimilarityMode::Lexical);
        assert!("fuzzy".parse::<SimilarityMode>().is_err());
    }
}
