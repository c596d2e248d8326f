//! The storage engine: schema, migrations, and CRUD over a single SQLite
//! database file (SPEC_FULL.md §4.2).
//!
//! Exactly one [`Connection`] per open database, guarded by a mutex and
//! driven from async callers via `spawn_blocking` (SPEC_FULL.md §5: "one
//! database connection pool per process per database file").

mod chunks;
mod embeddings;
mod files;
mod filters;
mod lexical;
mod metadata;
mod migrations;
mod reindex;
mod subprojects;

pub use reindex::{ChunkWrite, FileWrite};

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tokio_util::sync::CancellationToken;

use crate::error::{PommelError, Result};

pub const INDEX_DIR_NAME: &str = ".pommel";
pub const INDEX_FILE_NAME: &str = "index.db";

/// Owns the single SQLite connection backing one project's index.
pub struct Storage {
    conn: Arc<Mutex<Connection>>,
    db_path: PathBuf,
    dimension: usize,
}

impl Storage {
    /// Open (creating if absent) the index database under
    /// `<project_root>/.pommel/index.db`, run any pending migrations, and
    /// verify the embedding dimension matches what was previously
    /// established.
    pub fn open(project_root: &Path, dimension: usize) -> Result<Self> {
        let dir = project_root.join(INDEX_DIR_NAME);
        std::fs::create_dir_all(&dir).map_err(|e| PommelError::io_at(&dir, e))?;
        let db_path = dir.join(INDEX_FILE_NAME);

        // SAFETY: `sqlite3_vec_init` is the extension entry point exported by
        // the sqlite-vec crate; `sqlite3_auto_extension` requires the raw
        // function pointer cast to its FFI signature, the pattern documented
        // by the sqlite-vec crate itself.
        unsafe {
            rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
                sqlite_vec::sqlite3_vec_init as *const (),
            )));
        }

        let conn = Connection::open(&db_path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )?;

        migrations::apply(&conn, dimension)?;
        metadata::verify_or_establish_embedding_identity(&conn, dimension)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path,
            dimension,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Run a blocking closure against the connection on a blocking-pool
    /// thread, so the async surface never blocks its executor.
    async fn query<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            f(&guard)
        })
        .await?
    }

    fn check_cancelled(token: &CancellationToken) -> Result<()> {
        if token.is_cancelled() {
            Err(PommelError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "mod.test.rs"]
mod tests;
