//! Chunk → embed → persist orchestration for added/changed files
//! (SPEC_FULL.md §4.5).

mod file_locks;

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::chunker::Chunker;
use crate::embeddings::Embedder;
use crate::embeddings::cache::EmbeddingCache;
use crate::error::{PommelError, Result};
use crate::hash::sha256_hex;
use crate::storage::{ChunkWrite, FileWrite, Storage};
use crate::subproject::SubprojectIndex;
use crate::types::{FileOutcome, IndexReport, SourceFile};

use file_locks::FileLocks;

/// Orchestrates indexing over a bounded worker pool (SPEC_FULL.md §5
/// "bounded worker pool ... not an unbounded spawn-per-file fan-out"). Each
/// worker task owns its own [`Chunker`] (SPEC_FULL.md §5 "each worker owns
/// its own chunker state and embedder handle").
pub struct IndexPipeline<E: Embedder> {
    storage: Arc<Storage>,
    cache: Arc<EmbeddingCache<E>>,
    worker_count: usize,
}

impl<E: Embedder + 'static> IndexPipeline<E> {
    pub fn new(storage: Arc<Storage>, cache: Arc<EmbeddingCache<E>>, worker_count: usize) -> Self {
        Self {
            storage,
            cache,
            worker_count: worker_count.max(1),
        }
    }

    /// Indexes every file in `files`, skipping those whose
    /// `(content_hash, modified_at)` match the stored row. Per-file failures
    /// are captured in the returned report rather than aborting the run
    /// (SPEC_FULL.md §4.5, §7 "Per-file indexing errors ... do not abort
    /// the job").
    pub async fn index(&self, files: Vec<SourceFile>, token: CancellationToken) -> Result<IndexReport> {
        let subprojects = Arc::new(SubprojectIndex::load(&self.storage).await?);
        let file_locks = Arc::new(FileLocks::new());
        let semaphore = Arc::new(Semaphore::new(self.worker_count));

        let mut tasks = JoinSet::new();
        for file in files {
            if token.is_cancelled() {
                break;
            }
            let storage = self.storage.clone();
            let cache = self.cache.clone();
            let subprojects = subprojects.clone();
            let file_locks = file_locks.clone();
            let semaphore = semaphore.clone();
            let token = token.clone();

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore is never closed while tasks are outstanding");
                let path = file.path.clone();
                let _file_lock = file_locks.lock(&path).await;
                let outcome = index_one_file(&storage, &cache, &subprojects, &file, &token).await;
                (path, outcome)
            });
        }

        let mut report = IndexReport::default();
        while let Some(joined) = tasks.join_next().await {
            let (path, outcome) = joined?;
            match outcome {
                Ok(result) => report.record(&path, result),
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "per-file indexing failed");
                    report.record(&path, FileOutcome::Failed { error: e.to_string() });
                }
            }
        }
        Ok(report)
    }
}

async fn index_one_file<E: Embedder>(
    storage: &Storage,
    cache: &EmbeddingCache<E>,
    subprojects: &SubprojectIndex,
    file: &SourceFile,
    token: &CancellationToken,
) -> Result<FileOutcome> {
    let content_hash = sha256_hex(file.content.as_bytes());

    if let Some(existing) = storage.get_file_by_path(&file.path).await? {
        if existing.content_hash == content_hash && existing.modified_at == file.modified_at {
            return Ok(FileOutcome::Unchanged);
        }
    }
    check_cancelled(token)?;

    let file_write = FileWrite {
        path: file.path.clone(),
        content_hash,
        size: file.content.len() as u64,
        modified_at: file.modified_at,
        language: file.language.clone(),
    };

    // `file_id` is only needed to stamp FK values at write time; the chunker
    // doesn't need a real one (the `files` row isn't written until
    // `replace_file_chunks` commits alongside the chunks themselves, so a
    // mid-flight failure never leaves a stale `content_hash` behind).
    let mut chunker = Chunker::new();
    let output = chunker.chunk(0, file)?;
    if let Some(reason) = output.skipped {
        tracing::info!(path = %file.path, reason = %reason, "skipped (binary/minified), clearing any prior chunks");
        storage.replace_file_chunks(file_write, Vec::new()).await?;
        return Ok(FileOutcome::Indexed { chunks: 0 });
    }

    let mut chunks = output.chunks;
    if let Some(subproject) = subprojects.subproject_for(&file.path) {
        for chunk in &mut chunks {
            chunk.subproject_id = Some(subproject.id.clone());
            chunk.subproject_path = Some(subproject.path.clone());
        }
    }

    check_cancelled(token)?;
    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let vectors = cache.embed(&texts).await?;

    let chunks_written = chunks.len();
    let writes: Vec<ChunkWrite> = chunks
        .into_iter()
        .zip(vectors)
        .map(|(chunk, embedding)| ChunkWrite { chunk, embedding })
        .collect();

    storage.replace_file_chunks(file_write, writes).await?;
    Ok(FileOutcome::Indexed { chunks: chunks_written })
}

fn check_cancelled(token: &CancellationToken) -> Result<()> {
    if token.is_cancelled() {
        Err(PommelError::Cancelled)
    } else {
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod.test.rs"]
mod tests;
