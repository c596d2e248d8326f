//! Relational filter evaluation (SPEC_FULL.md §4.3 "Filter evaluation").

use rusqlite::ToSql;

use super::Storage;
use crate::error::Result;
use crate::types::SearchFilters;

impl Storage {
    /// Builds the candidate chunk-id set for `filters`. Returns `None` when
    /// there are no filters (callers should skip candidate materialization
    /// entirely), `Some(ids)` otherwise — an empty `Some` means the caller
    /// must short-circuit to an empty result without touching the dense or
    /// lexical indexes.
    pub async fn candidate_chunk_ids(&self, filters: &SearchFilters) -> Result<Option<Vec<String>>> {
        if filters.is_empty() {
            return Ok(None);
        }

        let mut predicates = Vec::new();
        let mut binds: Vec<Box<dyn ToSql + Send>> = Vec::new();

        if let Some(levels) = &filters.levels {
            let placeholders = levels.iter().map(|_| "?").collect::<Vec<_>>().join(",");
            predicates.push(format!("c.level IN ({placeholders})"));
            for level in levels {
                binds.push(Box::new(level.as_str().to_string()));
            }
        }
        if let Some(prefix) = &filters.path_prefix {
            predicates.push("f.path LIKE ? ESCAPE '\\'".to_string());
            binds.push(Box::new(format!("{}%", escape_like(prefix))));
        }
        if let Some(subproject_id) = &filters.subproject_id {
            predicates.push("c.subproject_id = ?".to_string());
            binds.push(Box::new(subproject_id.clone()));
        }
        if let Some(allow_list) = &filters.chunk_id_allow_list {
            if allow_list.is_empty() {
                return Ok(Some(Vec::new()));
            }
            let placeholders = allow_list.iter().map(|_| "?").collect::<Vec<_>>().join(",");
            predicates.push(format!("c.id IN ({placeholders})"));
            for id in allow_list {
                binds.push(Box::new(id.clone()));
            }
        }

        let sql = format!(
            "SELECT c.id FROM chunks c JOIN files f ON f.id = c.file_id WHERE {}",
            predicates.join(" AND ")
        );

        self.query(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn ToSql> = binds.iter().map(|b| b.as_ref() as &dyn ToSql).collect();
            let rows = stmt.query_map(params.as_slice(), |r| r.get::<_, String>(0))?;
            let ids: Vec<String> = rows.collect::<std::result::Result<_, _>>()?;
            Ok(Some(ids))
        })
        .await
    }
}

fn escape_like(input: &str) -> String {
    input.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
