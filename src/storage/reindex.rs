//! Atomic per-file replace: the indexing pipeline's single write primitive
//! (SPEC_FULL.md §4.5, §5 "A commit to files, chunks, chunk_embeddings, and
//! chunks_fts for one file happens inside one database transaction").
//!
//! The `files` row itself is folded into this same transaction (not written
//! separately beforehand): if the file row's `content_hash`/`modified_at`
//! were committed on their own before chunking/embedding finished, a
//! mid-flight failure would leave the file row pointing at the new content
//! while `chunks`/`chunk_embeddings`/`chunks_fts` still held the old chunk
//! set — and since the unchanged-file check compares exactly those two
//! columns, the next reindex attempt would see them already matching and
//! skip the file forever. Folding the upsert in here means a failure before
//! `tx.commit()` leaves the previous `files` row (or its absence) intact.
//!
//! `chunk_embeddings` and `chunks_fts` are virtual tables and cannot
//! participate in the `files`→`chunks` foreign-key cascade, so their rows
//! for this file's old chunk ids are cleared explicitly before the new rows
//! go in, all inside the same transaction (SPEC_FULL.md §9 "Vector store
//! integration").

use rusqlite::params;
use zerocopy::AsBytes;

use super::Storage;
use crate::error::{InvalidError, Result};
use crate::types::Chunk;

/// The `files` row fields to upsert alongside the chunk replace.
pub struct FileWrite {
    pub path: String,
    pub content_hash: String,
    pub size: u64,
    pub modified_at: i64,
    pub language: String,
}

/// One chunk's freshly computed embedding and lexical projection, ready to
/// be written alongside it.
pub struct ChunkWrite {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

impl Storage {
    /// Upserts the `files` row for `file.path` and replaces every
    /// chunk/embedding/lexical row owned by it with `writes`, all in one
    /// transaction. Returns the file's row id. The chunk set owned by the
    /// file beforehand is looked up and cleared inside the same transaction,
    /// so callers never need to fetch or pass old chunk ids themselves.
    pub async fn replace_file_chunks(&self, file: FileWrite, writes: Vec<ChunkWrite>) -> Result<i64> {
        let dimension = self.dimension;
        self.query(move |conn| {
            let tx = conn.unchecked_transaction()?;
            let indexed_at = now();

            let updated = tx.execute(
                "UPDATE files SET content_hash = ?2, size = ?3, modified_at = ?4,
                     indexed_at = ?5, language = ?6
                 WHERE path = ?1",
                params![file.path, file.content_hash, file.size, file.modified_at, indexed_at, file.language],
            )?;
            if updated == 0 {
                tx.execute(
                    "INSERT INTO files (path, content_hash, size, modified_at, indexed_at, language)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![file.path, file.content_hash, file.size, file.modified_at, indexed_at, file.language],
                )?;
            }
            let file_id: i64 =
                tx.query_row("SELECT id FROM files WHERE path = ?1", params![file.path], |r| r.get(0))?;

            let old_chunk_ids: Vec<String> = {
                let mut stmt = tx.prepare("SELECT id FROM chunks WHERE file_id = ?1")?;
                let rows = stmt.query_map(params![file_id], |r| r.get::<_, String>(0))?;
                rows.collect::<std::result::Result<_, _>>()?
            };
            for id in &old_chunk_ids {
                tx.execute("DELETE FROM chunk_embeddings WHERE chunk_id = ?1", params![id])?;
                tx.execute("DELETE FROM chunks_fts WHERE chunk_id = ?1", params![id])?;
            }
            tx.execute("DELETE FROM chunks WHERE file_id = ?1", params![file_id])?;

            for write in &writes {
                let chunk = &write.chunk;
                tx.execute(
                    "INSERT OR REPLACE INTO chunks
                        (id, file_id, level, name, start_line, end_line, content, content_hash,
                         parent_id, subproject_id, subproject_path)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    params![
                        chunk.id,
                        file_id,
                        chunk.level.as_str(),
                        chunk.name,
                        chunk.start_line,
                        chunk.end_line,
                        chunk.content,
                        chunk.content_hash,
                        chunk.parent_id,
                        chunk.subproject_id,
                        chunk.subproject_path,
                    ],
                )?;
                tx.execute(
                    "INSERT INTO chunks_fts (chunk_id, content, name, file_path) VALUES (?1, ?2, ?3, ?4)",
                    params![chunk.id, chunk.content, chunk.name, file.path],
                )?;

                if write.embedding.len() != dimension {
                    return Err(InvalidError::VectorWidthMismatch {
                        expected: dimension,
                        actual: write.embedding.len(),
                    }
                    .into());
                }
                tx.execute(
                    "INSERT INTO chunk_embeddings (chunk_id, embedding) VALUES (?1, ?2)",
                    params![chunk.id, write.embedding.as_bytes()],
                )?;
            }

            tx.commit()?;
            Ok(file_id)
        })
        .await
    }
}

fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "reindex.test.rs"]
mod tests;
