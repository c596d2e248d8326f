//! FTS5 lexical virtual table access (SPEC_FULL.md §4.2 "Lexical
//! semantics", §4.3 "Lexical path").

use rusqlite::params;
use tokio_util::sync::CancellationToken;

use super::Storage;
use crate::error::Result;
use crate::types::RankedChunk;

impl Storage {
    pub async fn upsert_lexical(&self, chunk_id: &str, content: &str, name: &str, file_path: &str) -> Result<()> {
        let chunk_id = chunk_id.to_string();
        let content = content.to_string();
        let name = name.to_string();
        let file_path = file_path.to_string();
        self.query(move |conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute("DELETE FROM chunks_fts WHERE chunk_id = ?1", params![chunk_id])?;
            tx.execute(
                "INSERT INTO chunks_fts (chunk_id, content, name, file_path) VALUES (?1, ?2, ?3, ?4)",
                params![chunk_id, content, name, file_path],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    pub async fn delete_lexical(&self, chunk_ids: &[String]) -> Result<()> {
        let ids = chunk_ids.to_vec();
        self.query(move |conn| {
            let tx = conn.unchecked_transaction()?;
            for id in &ids {
                tx.execute("DELETE FROM chunks_fts WHERE chunk_id = ?1", params![id])?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    /// Clears and rebuilds `chunks_fts` from `chunks⋈files`, checking
    /// `token` between rows (SPEC_FULL.md §4.2 "PopulateFTS").
    pub async fn populate_fts(&self, token: CancellationToken) -> Result<()> {
        self.query(move |conn| {
            conn.execute_batch("DELETE FROM chunks_fts")?;

            let rows: Vec<(String, String, String, String)> = {
                let mut stmt = conn.prepare(
                    "SELECT c.id, c.content, c.name, f.path FROM chunks c JOIN files f ON f.id = c.file_id",
                )?;
                let mapped = stmt.query_map([], |r| {
                    Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?))
                })?;
                mapped.collect::<std::result::Result<_, _>>()?
            };

            let tx = conn.unchecked_transaction()?;
            for (id, content, name, path) in rows {
                Self::check_cancelled(&token)?;
                tx.execute(
                    "INSERT INTO chunks_fts (chunk_id, content, name, file_path) VALUES (?1, ?2, ?3, ?4)",
                    params![id, content, name, path],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    /// BM25-ranked search; returns `(chunk_id, -bm25)` so higher is better.
    pub async fn search_lexical(
        &self,
        query_text: &str,
        k: i64,
        candidates: Option<Vec<String>>,
    ) -> Result<Vec<RankedChunk>> {
        let sanitized = sanitize_query(query_text);
        if sanitized.is_empty() || k <= 0 {
            return Ok(Vec::new());
        }

        self.query(move |conn| {
            if matches!(&candidates, Some(ids) if ids.is_empty()) {
                return Ok(Vec::new());
            }

            let rows: Vec<(String, f64)> = match candidates {
                Some(ids) => {
                    let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
                    let sql = format!(
                        "SELECT chunk_id, bm25(chunks_fts) FROM chunks_fts
                         WHERE chunks_fts MATCH ?1 AND chunk_id IN ({placeholders})
                         ORDER BY bm25(chunks_fts) LIMIT ?{}",
                        ids.len() + 2
                    );
                    let mut stmt = conn.prepare(&sql)?;
                    let bound: Vec<Box<dyn rusqlite::ToSql>> = std::iter::once(
                        Box::new(sanitized.clone()) as Box<dyn rusqlite::ToSql>,
                    )
                    .chain(ids.iter().map(|id| Box::new(id.clone()) as Box<dyn rusqlite::ToSql>))
                    .chain(std::iter::once(Box::new(k) as Box<dyn rusqlite::ToSql>))
                    .collect();
                    let mapped = stmt.query_map(rusqlite::params_from_iter(bound), |r| {
                        Ok((r.get(0)?, r.get(1)?))
                    })?;
                    mapped.collect::<std::result::Result<_, _>>()?
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT chunk_id, bm25(chunks_fts) FROM chunks_fts
                         WHERE chunks_fts MATCH ?1
                         ORDER BY bm25(chunks_fts) LIMIT ?2",
                    )?;
                    let mapped = stmt.query_map(params![sanitized, k], |r| Ok((r.get(0)?, r.get(1)?)))?;
                    mapped.collect::<std::result::Result<_, _>>()?
                }
            };

            Ok(rows
                .into_iter()
                .map(|(chunk_id, bm25): (String, f64)| RankedChunk {
                    chunk_id,
                    score: -bm25,
                })
                .collect())
        })
        .await
    }
}

/// Strips characters that could confuse the FTS5 query grammar while
/// preserving `*` wildcard and `"phrases"` (SPEC_FULL.md §4.3).
fn sanitize_query(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '-' && matches!(chars.peek(), Some('-')) {
            // comment introducer `--`: drop the remainder of the line
            while let Some(&next) = chars.peek() {
                if next == '\n' {
                    break;
                }
                chars.next();
            }
            continue;
        }
        match c {
            '{' | '}' | '[' | ']' | '^' | '~' | '@' | '#' | '$' | '%' | '&' | ';' => continue,
            _ => out.push(c),
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "lexical.test.rs"]
mod tests;
