//! Pommel: a local code-search index. Ingests a source tree, chunks it
//! hierarchically, embeds and indexes the chunks, and serves hybrid
//! (vector + lexical) retrieval over a single embedded database file
//! (SPEC_FULL.md §1).
//!
//! [`PommelEngine`] is the crate's one public entry point: construction
//! takes an [`Embedder`] implementation, a [`PommelConfig`], and a project
//! root; everything downstream — search, indexing, subproject attribution —
//! is reached through it (SPEC_FULL.md §2, §9 "Config-driven global state").

pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod hash;
pub mod indexing;
pub mod search;
pub mod storage;
pub mod subproject;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use config::PommelConfig;
use embeddings::Embedder;
use embeddings::cache::EmbeddingCache;
use error::{ConflictError, Result};
use indexing::IndexPipeline;
use search::HybridSearcher;
use storage::Storage;
use types::{IndexReport, SearchOptions, SearchResult, SourceFile, Subproject, metadata_keys};

/// The engine: storage, embedding cache, search, and indexing wired
/// together at construction time. No part of it is reachable except
/// through this type (SPEC_FULL.md §9).
pub struct PommelEngine<E: Embedder + 'static> {
    storage: Arc<Storage>,
    cache: Arc<EmbeddingCache<E>>,
    search: HybridSearcher<E>,
    indexing: IndexPipeline<E>,
    config: PommelConfig,
}

impl<E: Embedder + 'static> PommelEngine<E> {
    /// Opens (creating if absent) the index database under
    /// `<project_root>/.pommel/index.db` and wires the engine's components
    /// together. Registers any subprojects declared in `config` that
    /// aren't already present.
    #[tracing::instrument(skip(embedder, config), fields(project_root = %project_root.display()))]
    pub async fn open(project_root: &Path, embedder: E, config: PommelConfig) -> Result<Self> {
        let dimension = config.embedding.dimensions;
        let storage = Arc::new(Storage::open(project_root, dimension)?);
        verify_or_establish_provider_identity(&storage, &config).await?;

        for declared in &config.subprojects.projects {
            if storage.get_subproject(&declared.id).await?.is_none() {
                storage
                    .insert_subproject(Subproject {
                        id: declared.id.clone(),
                        path: declared.path.clone(),
                        name: declared.name.clone(),
                        marker_file: None,
                        language_hint: None,
                        auto_detected: false,
                        created_at: now(),
                        updated_at: now(),
                    })
                    .await?;
            }
        }

        let cache = Arc::new(EmbeddingCache::new(embedder, config.cache_capacity));
        let search = HybridSearcher::new(storage.clone(), cache.clone(), config.fusion.clone());
        let indexing = IndexPipeline::new(storage.clone(), cache.clone(), config.indexing.worker_count);

        tracing::info!(db_path = %storage.db_path().display(), "engine ready");

        Ok(Self {
            storage,
            cache,
            search,
            indexing,
            config,
        })
    }

    pub async fn search(&self, options: SearchOptions) -> Result<Vec<SearchResult>> {
        self.search.search(options).await
    }

    pub async fn index(&self, files: Vec<SourceFile>, token: CancellationToken) -> Result<IndexReport> {
        self.indexing.index(files, token).await
    }

    pub fn cache_metrics(&self) -> embeddings::cache::CacheMetrics {
        self.cache.metrics()
    }

    pub fn config(&self) -> &PommelConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }
}

/// Mirrors [`storage::verify_or_establish_embedding_identity`]'s dimension
/// check for the provider/model half of the identity triple (SPEC_FULL.md
/// §3: "once a provider/model/width triple is established ... any attempt
/// to index with a different triple must force a full rebuild or be
/// rejected"). Dimension itself is checked inside `Storage::open`.
async fn verify_or_establish_provider_identity(storage: &Storage, config: &PommelConfig) -> Result<()> {
    let provider = storage.get_metadata(metadata_keys::EMBEDDING_PROVIDER).await?;
    let model = storage.get_metadata(metadata_keys::EMBEDDING_MODEL).await?;

    match (provider, model) {
        (None, None) => {
            storage
                .set_metadata(metadata_keys::EMBEDDING_PROVIDER, &config.embedding.provider)
                .await?;
            storage
                .set_metadata(metadata_keys::EMBEDDING_MODEL, &config.embedding.model)
                .await?;
            Ok(())
        }
        (old_provider, old_model) => {
            let old_provider = old_provider.unwrap_or_default();
            let old_model = old_model.unwrap_or_default();
            if old_provider != config.embedding.provider || old_model != config.embedding.model {
                Err(ConflictError::EmbeddingIdentityChanged {
                    old_provider,
                    old_model,
                    old_width: storage.dimension(),
                    new_provider: config.embedding.provider.clone(),
                    new_model: config.embedding.model.clone(),
                    new_width: config.embedding.dimensions,
                }
                .into())
            } else {
                Ok(())
            }
        }
    }
}

fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "lib.test.rs"]
mod tests;
