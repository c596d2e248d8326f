//! Chunk row CRUD (SPEC_FULL.md §4.2 "Chunk upsert semantics").

use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension, params};

use super::Storage;
use crate::error::Result;
use crate::types::{Chunk, Level, SearchResult};

impl Storage {
    /// Insert-or-replace by id. Safe to call repeatedly with an unchanged
    /// chunk (content-derived ids make this a logical no-op).
    pub async fn upsert_chunk(&self, chunk: Chunk) -> Result<()> {
        self.query(move |conn| upsert(conn, &chunk)).await
    }

    pub async fn upsert_chunks(&self, chunks: Vec<Chunk>) -> Result<()> {
        self.query(move |conn| {
            let tx = conn.unchecked_transaction()?;
            for chunk in &chunks {
                upsert(&tx, chunk)?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    pub async fn get_chunk(&self, id: &str) -> Result<Option<Chunk>> {
        let id = id.to_string();
        self.query(move |conn| get(conn, &id)).await
    }

    pub async fn get_chunks(&self, ids: &[String]) -> Result<Vec<Chunk>> {
        let ids = ids.to_vec();
        self.query(move |conn| {
            let mut out = Vec::with_capacity(ids.len());
            for id in &ids {
                if let Some(c) = get(conn, id)? {
                    out.push(c);
                }
            }
            Ok(out)
        })
        .await
    }

    /// All chunk ids belonging to a file, used before deleting/replacing a
    /// file's chunk set.
    pub async fn chunk_ids_for_file(&self, file_id: i64) -> Result<Vec<String>> {
        self.query(move |conn| {
            let mut stmt = conn.prepare("SELECT id FROM chunks WHERE file_id = ?1")?;
            let rows = stmt.query_map(params![file_id], |r| r.get::<_, String>(0))?;
            Ok(rows.collect::<std::result::Result<_, _>>()?)
        })
        .await
    }

    /// Drops every chunk row owned by `file_id`. Callers are responsible for
    /// also clearing the owning chunk ids from `chunk_embeddings`/
    /// `chunks_fts` first, since those virtual tables don't cascade
    /// (SPEC_FULL.md §9 "Vector store integration").
    pub async fn delete_chunks_for_file(&self, file_id: i64) -> Result<()> {
        self.query(move |conn| {
            conn.execute("DELETE FROM chunks WHERE file_id = ?1", params![file_id])?;
            Ok(())
        })
        .await
    }

    /// Fetches full chunk rows joined with owning-file metadata, keyed by
    /// chunk id, for hydrating ranked search hits (SPEC_FULL.md §4.3
    /// "Hydration"). Score is left at 0.0; callers fill it in from the
    /// fused rank list.
    pub async fn hydrate(&self, ids: &[String]) -> Result<HashMap<String, SearchResult>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let ids = ids.to_vec();
        self.query(move |conn| {
            let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
            let sql = format!(
                "SELECT c.id, c.start_line, c.end_line, c.level, c.name, c.content, f.path, f.language
                 FROM chunks c JOIN files f ON f.id = c.file_id
                 WHERE c.id IN ({placeholders})"
            );
            let mut stmt = conn.prepare(&sql)?;
            let bound: Vec<Box<dyn rusqlite::ToSql>> =
                ids.iter().map(|id| Box::new(id.clone()) as Box<dyn rusqlite::ToSql>).collect();
            let rows = stmt.query_map(rusqlite::params_from_iter(bound), |r| {
                let level: String = r.get(3)?;
                Ok(SearchResult {
                    chunk_id: r.get(0)?,
                    start_line: r.get(1)?,
                    end_line: r.get(2)?,
                    level: Level::from_str(&level).unwrap_or(Level::File),
                    name: r.get(4)?,
                    content: r.get(5)?,
                    file_path: r.get(6)?,
                    language: r.get(7)?,
                    score: 0.0,
                })
            })?;

            let mut out = HashMap::new();
            for row in rows {
                let result = row?;
                out.insert(result.chunk_id.clone(), result);
            }
            Ok(out)
        })
        .await
    }
}

fn upsert(conn: &Connection, chunk: &Chunk) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO chunks
            (id, file_id, level, name, start_line, end_line, content, content_hash,
             parent_id, subproject_id, subproject_path)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            chunk.id,
            chunk.file_id,
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
    Ok(())
}

fn get(conn: &Connection, id: &str) -> Result<Option<Chunk>> {
    conn.query_row(
        "SELECT id, file_id, level, name, start_line, end_line, content, content_hash,
                parent_id, subproject_id, subproject_path
         FROM chunks WHERE id = ?1",
        params![id],
        |r| {
            let level: String = r.get(2)?;
            Ok(Chunk {
                id: r.get(0)?,
                file_id: r.get(1)?,
                level: Level::from_str(&level).unwrap_or(Level::File),
                name: r.get(3)?,
                start_line: r.get(4)?,
                end_line: r.get(5)?,
                content: r.get(6)?,
                content_hash: r.get(7)?,
                parent_id: r.get(8)?,
                subproject_id: r.get(9)?,
                subproject_path: r.get(10)?,
            })
        },
    )
    .optional()
    .map_err(Into::into)
}
