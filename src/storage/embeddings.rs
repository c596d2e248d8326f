//! Vector virtual table access (SPEC_FULL.md §4.2 "Embedding semantics",
//! §4.3 "Dense path").
//!
//! `vec0` has no atomic replace primitive, so every write here is
//! delete-then-insert inside the caller's transaction (SPEC_FULL.md §9
//! "Vector store integration").

use rusqlite::{Connection, params};
use zerocopy::AsBytes;

use super::Storage;
use crate::error::{InvalidError, Result};
use crate::types::RankedChunk;

impl Storage {
    pub async fn upsert_embedding(&self, chunk_id: &str, vector: Vec<f32>) -> Result<()> {
        let chunk_id = chunk_id.to_string();
        let dimension = self.dimension;
        self.query(move |conn| {
            let tx = conn.unchecked_transaction()?;
            replace_embedding(&tx, &chunk_id, &vector, dimension)?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    /// Batch insert over parallel arrays; rejects mismatched lengths and
    /// commits as one transaction.
    pub async fn upsert_embeddings(&self, ids: Vec<String>, vectors: Vec<Vec<f32>>) -> Result<()> {
        if ids.len() != vectors.len() {
            return Err(InvalidError::BatchLengthMismatch {
                ids: ids.len(),
                vectors: vectors.len(),
            }
            .into());
        }
        let dimension = self.dimension;
        self.query(move |conn| {
            let tx = conn.unchecked_transaction()?;
            for (id, vector) in ids.iter().zip(vectors.iter()) {
                replace_embedding(&tx, id, vector, dimension)?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    pub async fn delete_embeddings(&self, chunk_ids: &[String]) -> Result<()> {
        let ids = chunk_ids.to_vec();
        self.query(move |conn| {
            let tx = conn.unchecked_transaction()?;
            for id in &ids {
                tx.execute("DELETE FROM chunk_embeddings WHERE chunk_id = ?1", params![id])?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    /// k-NN search, optionally restricted to a candidate chunk-id set
    /// (SPEC_FULL.md §4.3 "Filter evaluation"). Scores are
    /// `1/(1+distance)`, so higher is better and results stay ordered by
    /// ascending distance.
    pub async fn search_vector(
        &self,
        query: Vec<f32>,
        k: i64,
        candidates: Option<Vec<String>>,
    ) -> Result<Vec<RankedChunk>> {
        if query.len() != self.dimension {
            return Err(InvalidError::VectorWidthMismatch {
                expected: self.dimension,
                actual: query.len(),
            }
            .into());
        }
        if k <= 0 {
            return Ok(Vec::new());
        }

        self.query(move |conn| {
            let has_vectors: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM chunk_embeddings LIMIT 1)",
                [],
                |r| r.get(0),
            )?;
            if !has_vectors {
                return Ok(Vec::new());
            }

            let query_bytes = query.as_bytes().to_vec();

            let rows: Vec<(String, f64)> = match candidates {
                Some(ids) if ids.is_empty() => return Ok(Vec::new()),
                Some(ids) => {
                    let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
                    let sql = format!(
                        "SELECT chunk_id, distance FROM chunk_embeddings
                         WHERE embedding MATCH ?1 AND k = ?2 AND chunk_id IN ({placeholders})"
                    );
                    let mut stmt = conn.prepare(&sql)?;
                    let bound: Vec<Box<dyn rusqlite::ToSql>> = std::iter::once(
                        Box::new(query_bytes.clone()) as Box<dyn rusqlite::ToSql>,
                    )
                    .chain(std::iter::once(Box::new(k) as Box<dyn rusqlite::ToSql>))
                    .chain(ids.iter().map(|id| Box::new(id.clone()) as Box<dyn rusqlite::ToSql>))
                    .collect();
                    let rows = stmt.query_map(rusqlite::params_from_iter(bound), |r| {
                        Ok((r.get(0)?, r.get(1)?))
                    })?;
                    rows.collect::<std::result::Result<_, _>>()?
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT chunk_id, distance FROM chunk_embeddings
                         WHERE embedding MATCH ?1 AND k = ?2",
                    )?;
                    let rows =
                        stmt.query_map(params![query_bytes, k], |r| Ok((r.get(0)?, r.get(1)?)))?;
                    rows.collect::<std::result::Result<_, _>>()?
                }
            };

            Ok(rows
                .into_iter()
                .map(|(chunk_id, distance): (String, f64)| RankedChunk {
                    chunk_id,
                    score: 1.0 / (1.0 + distance),
                })
                .collect())
        })
        .await
    }
}

fn replace_embedding(conn: &Connection, chunk_id: &str, vector: &[f32], dimension: usize) -> Result<()> {
    if vector.len() != dimension {
        return Err(InvalidError::VectorWidthMismatch {
            expected: dimension,
            actual: vector.len(),
        }
        .into());
    }
    conn.execute("DELETE FROM chunk_embeddings WHERE chunk_id = ?1", params![chunk_id])?;
    conn.execute(
        "INSERT INTO chunk_embeddings (chunk_id, embedding) VALUES (?1, ?2)",
        params![chunk_id, vector.as_bytes()],
    )?;
    Ok(())
}
