//! In-memory LRU cache in front of an [`Embedder`] (SPEC_FULL.md §4.4).
//!
//! The cache key is the raw text, byte for byte — callers that want
//! normalization (whitespace, case folding) compose it before calling in.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use super::Embedder;
use crate::error::Result;

/// Eventually-consistent, monotonically increasing cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
}

struct State {
    cache: LruCache<String, Vec<f32>>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Wraps an [`Embedder`], memoizing `text -> vector` with bounded capacity.
pub struct EmbeddingCache<E: Embedder> {
    inner: E,
    state: Mutex<State>,
}

impl<E: Embedder> EmbeddingCache<E> {
    /// `capacity` must be a positive number of entries.
    pub fn new(inner: E, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            state: Mutex::new(State {
                cache: LruCache::new(capacity),
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
        }
    }

    pub fn metrics(&self) -> CacheMetrics {
        let state = self.state.lock().unwrap();
        CacheMetrics {
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
            size: state.cache.len(),
        }
    }

    fn install(state: &mut State, key: String, vector: Vec<f32>) {
        if let Some((evicted_key, _)) = state.cache.push(key.clone(), vector)
            && evicted_key != key
        {
            state.evictions += 1;
        }
    }

    /// Hit bumps recency and returns without calling the underlying
    /// embedder; miss calls it for exactly this one text.
    pub async fn embed_single(&self, text: &str) -> Result<Vec<f32>> {
        {
            let mut state = self.state.lock().unwrap();
            if let Some(vector) = state.cache.get(text) {
                let vector = vector.clone();
                state.hits += 1;
                return Ok(vector);
            }
        }

        let vector = self.inner.embed_single(text).await?;

        let mut state = self.state.lock().unwrap();
        state.misses += 1;
        Self::install(&mut state, text.to_string(), vector.clone());
        Ok(vector)
    }

    /// Calls the underlying embedder exactly once, with exactly the texts
    /// that missed, never at all if every text was a hit.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        let mut miss_indices = Vec::new();
        let mut miss_texts = Vec::new();

        {
            let mut state = self.state.lock().unwrap();
            for (i, text) in texts.iter().enumerate() {
                if let Some(vector) = state.cache.get(text.as_str()) {
                    out[i] = Some(vector.clone());
                    state.hits += 1;
                } else {
                    miss_indices.push(i);
                    miss_texts.push(text.clone());
                }
            }
        }

        if !miss_texts.is_empty() {
            let fresh = self.inner.embed(&miss_texts).await?;
            if fresh.len() != miss_texts.len() {
                return Err(crate::error::PommelError::external(format!(
                    "embedder returned {} vectors for {} requested texts",
                    fresh.len(),
                    miss_texts.len()
                )));
            }

            let mut state = self.state.lock().unwrap();
            state.misses += miss_texts.len() as u64;
            for (slot, (text, vector)) in miss_indices
                .into_iter()
                .zip(miss_texts.into_iter().zip(fresh.into_iter()))
            {
                Self::install(&mut state, text, vector.clone());
                out[slot] = Some(vector);
            }
        }

        Ok(out.into_iter().map(|v| v.expect("every slot filled")).collect())
    }

    pub fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}

#[cfg(test)]
#[path = "cache.test.rs"]
mod tests;
