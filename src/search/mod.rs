//! Hybrid search: dense k-NN + lexical BM25 + relational filters, combined
//! with reciprocal rank fusion (SPEC_FULL.md §4.3).

pub mod fusion;

use std::sync::Arc;

use crate::config::FusionConfig;
use crate::embeddings::Embedder;
use crate::embeddings::cache::EmbeddingCache;
use crate::error::{InvalidError, Result};
use crate::storage::Storage;
use crate::types::{Query, RankedChunk, SearchMode, SearchOptions, SearchResult};

/// Fusion fanout: each sub-search is run with `max(K, K*fanout)` so the
/// fused ranking has enough candidates per source to be meaningful.
fn fanout_limit(k: i64, fanout: i64) -> i64 {
    k.max(k.saturating_mul(fanout))
}

pub struct HybridSearcher<E: Embedder> {
    storage: Arc<Storage>,
    cache: Arc<EmbeddingCache<E>>,
    fusion: FusionConfig,
}

impl<E: Embedder> HybridSearcher<E> {
    pub fn new(storage: Arc<Storage>, cache: Arc<EmbeddingCache<E>>, fusion: FusionConfig) -> Self {
        Self { storage, cache, fusion }
    }

    pub async fn search(&self, options: SearchOptions) -> Result<Vec<SearchResult>> {
        if options.limit <= 0 {
            return Ok(Vec::new());
        }

        let candidates = self.storage.candidate_chunk_ids(&options.filters).await?;
        if matches!(&candidates, Some(ids) if ids.is_empty()) {
            return Ok(Vec::new());
        }

        let fanout = fanout_limit(options.limit, self.fusion.fanout);

        let ranked = match options.mode {
            SearchMode::Dense => {
                self.dense_search(&options.query, fanout, candidates.clone()).await?
            }
            SearchMode::Lexical => self.lexical_search(&options.query, fanout, candidates.clone()).await?,
            SearchMode::Hybrid => {
                let (dense, lexical) = tokio::join!(
                    self.dense_search(&options.query, fanout, candidates.clone()),
                    self.lexical_search(&options.query, fanout, candidates.clone()),
                );
                let dense = dense?;
                let lexical = lexical?;
                fusion::fuse(
                    &[
                        fusion::RrfSource { ranked: &dense, weight: 1.0 },
                        fusion::RrfSource { ranked: &lexical, weight: 1.0 },
                    ],
                    self.fusion.k as f64,
                    options.limit,
                )
            }
        };

        let top: Vec<RankedChunk> = ranked.into_iter().take(options.limit as usize).collect();
        self.hydrate(top).await
    }

    async fn dense_search(
        &self,
        query: &Query,
        limit: i64,
        candidates: Option<Vec<String>>,
    ) -> Result<Vec<RankedChunk>> {
        let vector = match query {
            Query::Vector(v) => v.clone(),
            Query::Text(text) => {
                if text.trim().is_empty() {
                    return Ok(Vec::new());
                }
                self.cache.embed_single(text).await?
            }
        };
        if vector.len() != self.storage.dimension() {
            return Err(InvalidError::VectorWidthMismatch {
                expected: self.storage.dimension(),
                actual: vector.len(),
            }
            .into());
        }
        self.storage.search_vector(vector, limit, candidates).await
    }

    async fn lexical_search(
        &self,
        query: &Query,
        limit: i64,
        candidates: Option<Vec<String>>,
    ) -> Result<Vec<RankedChunk>> {
        let text = match query {
            Query::Text(t) => t.clone(),
            Query::Vector(_) => return Ok(Vec::new()),
        };
        self.storage.search_lexical(&text, limit, candidates).await
    }

    /// Hydrates the fused ranking, preserving fused order (SPEC_FULL.md
    /// §4.3 "Hydration").
    async fn hydrate(&self, ranked: Vec<RankedChunk>) -> Result<Vec<SearchResult>> {
        let ids: Vec<String> = ranked.iter().map(|r| r.chunk_id.clone()).collect();
        let mut rows = self.storage.hydrate(&ids).await?;

        let mut out = Vec::with_capacity(ranked.len());
        for entry in ranked {
            if let Some(mut result) = rows.remove(&entry.chunk_id) {
                result.score = entry.score;
                out.push(result);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "mod.test.rs"]
mod tests;
