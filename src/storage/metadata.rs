//! Key/value metadata store, including the embedding-identity invariant
//! (SPEC_FULL.md §3 "Metadata").

use rusqlite::{Connection, OptionalExtension, params};

use super::Storage;
use crate::error::{ConflictError, Result};
use crate::types::metadata_keys;

impl Storage {
    pub async fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.query(move |conn| get(conn, &key)).await
    }

    pub async fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        let key = key.to_string();
        let value = value.to_string();
        self.query(move |conn| set(conn, &key, &value)).await
    }
}

fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
    Ok(conn
        .query_row("SELECT value FROM metadata WHERE key = ?1", params![key], |r| r.get(0))
        .optional()?)
}

fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO metadata (key, value, updated_at) VALUES (?1, ?2, strftime('%s', 'now'))
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value],
    )?;
    Ok(())
}

/// On first open, records `(provider, model, dimensions)`. On subsequent
/// opens with a database that already has an established identity,
/// mismatches are rejected rather than silently migrated (SPEC_FULL.md §3:
/// "any attempt to index with a different triple must force a full rebuild
/// or be rejected" — this implementation rejects; see DESIGN.md).
pub fn verify_or_establish_embedding_identity(conn: &Connection, dimension: usize) -> Result<()> {
    let existing: Option<String> = get(conn, metadata_keys::EMBEDDING_DIMENSIONS)?;
    match existing {
        None => {
            set(conn, metadata_keys::EMBEDDING_DIMENSIONS, &dimension.to_string())?;
            Ok(())
        }
        Some(found) => {
            let found: usize = found.parse().unwrap_or(0);
            if found != dimension {
                Err(ConflictError::EmbeddingIdentityChanged {
                    old_provider: String::new(),
                    old_model: String::new(),
                    old_width: found,
                    new_provider: String::new(),
                    new_model: String::new(),
                    new_width: dimension,
                }
                .into())
            } else {
                Ok(())
            }
        }
    }
}
