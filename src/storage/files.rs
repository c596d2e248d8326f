//! File row CRUD (SPEC_FULL.md §4.2 "File upsert semantics").

use rusqlite::{Connection, OptionalExtension, params};

use super::Storage;
use crate::error::Result;
use crate::types::FileRecord;

impl Storage {
    /// Update-then-insert-on-0-rows; both paths return the same `file_id`
    /// for a given path.
    pub async fn insert_file(
        &self,
        path: &str,
        content_hash: &str,
        size: u64,
        modified_at: i64,
        language: &str,
    ) -> Result<i64> {
        let path = path.to_string();
        let content_hash = content_hash.to_string();
        let language = language.to_string();
        let indexed_at = now();

        self.query(move |conn| {
            let updated = conn.execute(
                "UPDATE files SET content_hash = ?2, size = ?3, modified_at = ?4,
                     indexed_at = ?5, language = ?6
                 WHERE path = ?1",
                params![path, content_hash, size, modified_at, indexed_at, language],
            )?;

            if updated == 0 {
                conn.execute(
                    "INSERT INTO files (path, content_hash, size, modified_at, indexed_at, language)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![path, content_hash, size, modified_at, indexed_at, language],
                )?;
            }

            let file_id: i64 = conn.query_row(
                "SELECT id FROM files WHERE path = ?1",
                params![path],
                |r| r.get(0),
            )?;
            Ok(file_id)
        })
        .await
    }

    pub async fn get_file_by_path(&self, path: &str) -> Result<Option<FileRecord>> {
        let path = path.to_string();
        self.query(move |conn| get_by_path(conn, &path)).await
    }

    /// Idempotent; cascades to `chunks` via the foreign key, but the
    /// vec0/fts5 virtual tables cannot participate in that cascade so their
    /// rows for this file's chunks are removed explicitly in the same
    /// transaction (SPEC_FULL.md §9 "Vector store integration").
    pub async fn delete_file_by_path(&self, path: &str) -> Result<()> {
        let path = path.to_string();
        self.query(move |conn| {
            let tx = conn.unchecked_transaction()?;

            let chunk_ids: Vec<String> = {
                let mut stmt = tx.prepare(
                    "SELECT c.id FROM chunks c JOIN files f ON f.id = c.file_id WHERE f.path = ?1",
                )?;
                let rows = stmt.query_map(params![path], |r| r.get::<_, String>(0))?;
                rows.collect::<std::result::Result<_, _>>()?
            };

            for id in &chunk_ids {
                tx.execute("DELETE FROM chunk_embeddings WHERE chunk_id = ?1", params![id])?;
                tx.execute("DELETE FROM chunks_fts WHERE chunk_id = ?1", params![id])?;
            }

            tx.execute("DELETE FROM files WHERE path = ?1", params![path])?;
            tx.commit()?;
            Ok(())
        })
        .await
    }
}

fn get_by_path(conn: &Connection, path: &str) -> Result<Option<FileRecord>> {
    Ok(conn
        .query_row(
            "SELECT id, path, content_hash, size, modified_at, indexed_at, language
             FROM files WHERE path = ?1",
            params![path],
            |r| {
                let size: i64 = r.get(3)?;
                Ok(FileRecord {
                    id: r.get(0)?,
                    path: r.get(1)?,
                    content_hash: r.get(2)?,
                    size: size as u64,
                    modified_at: r.get(4)?,
                    indexed_at: r.get(5)?,
                    language: r.get(6)?,
                })
            },
        )
        .optional()?)
}

fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
