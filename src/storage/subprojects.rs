//! Subproject row CRUD (SPEC_FULL.md §3 "Subproject", §4.6).

use rusqlite::{OptionalExtension, params};

use super::Storage;
use crate::error::{ConflictError, Result};
use crate::types::Subproject;

impl Storage {
    pub async fn insert_subproject(&self, subproject: Subproject) -> Result<()> {
        self.query(move |conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM subprojects WHERE path = ?1 AND id != ?2)",
                params![subproject.path, subproject.id],
                |r| r.get(0),
            )?;
            if exists {
                return Err(ConflictError::SubprojectPathExists {
                    path: subproject.path.clone(),
                }
                .into());
            }

            conn.execute(
                "INSERT OR REPLACE INTO subprojects
                    (id, path, name, marker_file, language_hint, auto_detected, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    subproject.id,
                    subproject.path,
                    subproject.name,
                    subproject.marker_file,
                    subproject.language_hint,
                    subproject.auto_detected as i64,
                    subproject.created_at,
                    subproject.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn get_subproject(&self, id: &str) -> Result<Option<Subproject>> {
        let id = id.to_string();
        self.query(move |conn| {
            conn.query_row(
                "SELECT id, path, name, marker_file, language_hint, auto_detected, created_at, updated_at
                 FROM subprojects WHERE id = ?1",
                params![id],
                row_to_subproject,
            )
            .optional()
            .map_err(Into::into)
        })
        .await
    }

    pub async fn list_subprojects(&self) -> Result<Vec<Subproject>> {
        self.query(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, path, name, marker_file, language_hint, auto_detected, created_at, updated_at
                 FROM subprojects",
            )?;
            let rows = stmt.query_map([], row_to_subproject)?;
            Ok(rows.collect::<std::result::Result<_, _>>()?)
        })
        .await
    }
}

fn row_to_subproject(r: &rusqlite::Row) -> rusqlite::Result<Subproject> {
    let auto_detected: i64 = r.get(5)?;
    Ok(Subproject {
        id: r.get(0)?,
        path: r.get(1)?,
        name: r.get(2)?,
        marker_file: r.get(3)?,
        language_hint: r.get(4)?,
        auto_detected: auto_detected != 0,
        created_at: r.get(6)?,
        updated_at: r.get(7)?,
    })
}
