use super::*;
use crate::types::Level;
use tempfile::TempDir;

fn chunk(id: &str, file_id: i64, content: &str) -> Chunk {
    Chunk {
        id: id.to_string(),
        file_id,
        level: Level::Method,
        name: "f".to_string(),
        start_line: 1,
        end_line: 1,
        content: content.to_string(),
        content_hash: crate::hash::sha256_hex(content.as_bytes()),
        parent_id: None,
        subproject_id: None,
        subproject_path: None,
    }
}

fn file_write(path: &str, content_hash: &str) -> FileWrite {
    FileWrite {
        path: path.to_string(),
        content_hash: content_hash.to_string(),
        size: 1,
        modified_at: 1,
        language: "rust".to_string(),
    }
}

#[tokio::test]
async fn replace_is_all_or_nothing_on_width_mismatch() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::open(dir.path(), 4).unwrap();

    let writes = vec![
        ChunkWrite { chunk: chunk("c1", 0, "one"), embedding: vec![0.0; 4] },
        ChunkWrite { chunk: chunk("c2", 0, "two"), embedding: vec![0.0; 2] },
    ];
    let err = storage.replace_file_chunks(file_write("a.rs", "h1"), writes).await;
    assert!(err.is_err());

    assert!(
        storage.get_file_by_path("a.rs").await.unwrap().is_none(),
        "a width-mismatch failure must roll back the files-row upsert too"
    );
}

#[tokio::test]
async fn replace_clears_old_rows_before_writing_new_ones() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::open(dir.path(), 4).unwrap();

    let first = vec![ChunkWrite { chunk: chunk("old", 0, "old body"), embedding: vec![0.0; 4] }];
    let file_id = storage.replace_file_chunks(file_write("a.rs", "h1"), first).await.unwrap();

    let second = vec![ChunkWrite { chunk: chunk("new", 0, "new body"), embedding: vec![1.0; 4] }];
    storage.replace_file_chunks(file_write("a.rs", "h2"), second).await.unwrap();

    let ids = storage.chunk_ids_for_file(file_id).await.unwrap();
    assert_eq!(ids, vec!["new".to_string()]);
    assert!(storage.get_chunk("old").await.unwrap().is_none());
}

#[tokio::test]
async fn replace_upserts_the_file_row_in_the_same_transaction() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::open(dir.path(), 4).unwrap();

    let writes = vec![ChunkWrite { chunk: chunk("c1", 0, "body"), embedding: vec![0.0; 4] }];
    let file_id = storage.replace_file_chunks(file_write("a.rs", "h1"), writes).await.unwrap();

    let file = storage.get_file_by_path("a.rs").await.unwrap().unwrap();
    assert_eq!(file.id, file_id);
    assert_eq!(file.content_hash, "h1");
}

#[tokio::test]
async fn failed_replace_does_not_leave_a_stale_matching_file_row() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::open(dir.path(), 4).unwrap();

    let first = vec![ChunkWrite { chunk: chunk("c1", 0, "body"), embedding: vec![0.0; 4] }];
    storage.replace_file_chunks(file_write("a.rs", "h1"), first).await.unwrap();

    // Reindexing with new content that fails mid-write (width mismatch)
    // must not advance the stored content_hash to "h2" — otherwise the next
    // attempt's unchanged-file check would wrongly treat "h2" as already
    // indexed and skip it forever.
    let second = vec![ChunkWrite { chunk: chunk("c2", 0, "body2"), embedding: vec![0.0; 2] }];
    let err = storage.replace_file_chunks(file_write("a.rs", "h2"), second).await;
    assert!(err.is_err());

    let file = storage.get_file_by_path("a.rs").await.unwrap().unwrap();
    assert_eq!(file.content_hash, "h1");
}
