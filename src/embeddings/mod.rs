//! Embedding provider contract and the cache that sits in front of it.

pub mod cache;

use async_trait::async_trait;

use crate::error::Result;

/// An external embedding provider (SPEC_FULL.md §6).
///
/// Implementations are out of scope for this engine — only the call
/// contract is specified: every vector returned shares the provider's
/// configured width, and batch calls return vectors in input order.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_single(&self, text: &str) -> Result<Vec<f32>>;
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// The fixed vector width this provider produces.
    fn dimension(&self) -> usize;
}

/// Deterministic embedder for tests: hashes the text into a vector of the
/// configured width. Never makes network calls.
pub struct MockEmbedder {
    dimension: usize,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();
        (0..self.dimension)
            .map(|i| {
                let bits = seed.wrapping_add(i as u64).wrapping_mul(0x9E3779B97F4A7C15);
                ((bits >> 11) as f64 / u64::MAX as f64) as f32
            })
            .collect()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed_single(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vector_for(text))
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
#[path = "mod.test.rs"]
mod tests;
