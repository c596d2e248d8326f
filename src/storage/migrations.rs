//! Additive, forward-only numbered migrations (SPEC_FULL.md §4.2).
//!
//! Each migration bumps `schema_version` inside its own transaction;
//! repeat opens are no-ops (invariant 6: migrations are idempotent).

use rusqlite::Connection;

use crate::error::Result;

const CURRENT_VERSION: i64 = 3;

pub fn apply(conn: &Connection, dimension: usize) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        );",
    )?;

    let current: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if current < 1 {
        migrate_v1(conn)?;
        record(conn, 1)?;
    }
    if current < 2 {
        migrate_v2(conn, dimension)?;
        record(conn, 2)?;
    }
    if current < CURRENT_VERSION {
        migrate_v3(conn)?;
        record(conn, CURRENT_VERSION)?;
    }

    Ok(())
}

fn record(conn: &Connection, version: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_version (version, applied_at) VALUES (?1, strftime('%s', 'now'))",
        [version],
    )?;
    Ok(())
}

/// Core relational schema: files, chunks, subprojects, metadata.
fn migrate_v1(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS files (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            path TEXT NOT NULL UNIQUE,
            content_hash TEXT NOT NULL,
            size INTEGER NOT NULL,
            modified_at INTEGER NOT NULL,
            indexed_at INTEGER NOT NULL,
            language TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_files_path ON files(path);

        CREATE TABLE IF NOT EXISTS chunks (
            id TEXT PRIMARY KEY,
            file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
            level TEXT NOT NULL,
            name TEXT NOT NULL,
            start_line INTEGER NOT NULL,
            end_line INTEGER NOT NULL,
            content TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            parent_id TEXT REFERENCES chunks(id) ON DELETE CASCADE,
            subproject_id TEXT,
            subproject_path TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_chunks_file_id ON chunks(file_id);
        CREATE INDEX IF NOT EXISTS idx_chunks_level ON chunks(level);
        CREATE INDEX IF NOT EXISTS idx_chunks_parent_id ON chunks(parent_id);
        CREATE INDEX IF NOT EXISTS idx_chunks_subproject_id ON chunks(subproject_id);

        CREATE TABLE IF NOT EXISTS subprojects (
            id TEXT PRIMARY KEY,
            path TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            marker_file TEXT,
            language_hint TEXT,
            auto_detected INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_subprojects_path ON subprojects(path);

        CREATE TABLE IF NOT EXISTS metadata (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        );",
    )?;
    tx.commit()?;
    Ok(())
}

/// The vec0 virtual table, width fixed at creation time.
fn migrate_v2(conn: &Connection, dimension: usize) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    let sql = format!(
        "CREATE VIRTUAL TABLE IF NOT EXISTS chunk_embeddings USING vec0(
            chunk_id TEXT PRIMARY KEY,
            embedding float[{dimension}]
        )"
    );
    tx.execute_batch(&sql)?;
    tx.commit()?;
    Ok(())
}

/// The lexical virtual table, backfilled from `chunks` in the same
/// transaction per SPEC_FULL.md §4.2 ("Migration v3 ... must backfill
/// chunks_fts from existing chunks in one transaction").
fn migrate_v3(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE VIRTUAL TABLE IF NOT EXISTS chunks_fts USING fts5(
            chunk_id UNINDEXED,
            content,
            name,
            file_path,
            tokenize = 'porter unicode61'
        );",
    )?;

    tx.execute_batch(
        "INSERT INTO chunks_fts (chunk_id, content, name, file_path)
         SELECT c.id, c.content, c.name, f.path
         FROM chunks c
         JOIN files f ON f.id = c.file_id
         WHERE NOT EXISTS (SELECT 1 FROM chunks_fts WHERE chunks_fts.chunk_id = c.id);",
    )?;

    tx.commit()?;
    Ok(())
}
