use super::*;
use crate::types::{Chunk, Level, Subproject};
use tempfile::TempDir;

fn test_chunk(id: &str, file_id: i64, name: &str, start: u32, end: u32, content: &str) -> Chunk {
    Chunk {
        id: id.to_string(),
        file_id,
        level: Level::Method,
        name: name.to_string(),
        start_line: start,
        end_line: end,
        content: content.to_string(),
        content_hash: crate::hash::sha256_hex(content.as_bytes()),
        parent_id: None,
        subproject_id: None,
        subproject_path: None,
    }
}

#[tokio::test]
async fn open_creates_schema_and_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::open(dir.path(), 4).unwrap();
    assert!(storage.db_path().exists());
    drop(storage);

    // Reopening must be a no-op, not an error (invariant 6).
    let storage = Storage::open(dir.path(), 4).unwrap();
    assert_eq!(storage.dimension(), 4);
}

#[tokio::test]
async fn reopen_with_different_dimension_is_rejected() {
    let dir = TempDir::new().unwrap();
    let _storage = Storage::open(dir.path(), 4).unwrap();
    let reopened = Storage::open(dir.path(), 8);
    assert!(reopened.is_err());
}

#[tokio::test]
async fn insert_file_update_then_insert_returns_stable_id() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::open(dir.path(), 4).unwrap();

    let id1 = storage
        .insert_file("src/a.rs", "hash1", 10, 100, "rust")
        .await
        .unwrap();
    let id2 = storage
        .insert_file("src/a.rs", "hash2", 20, 200, "rust")
        .await
        .unwrap();
    assert_eq!(id1, id2);

    let file = storage.get_file_by_path("src/a.rs").await.unwrap().unwrap();
    assert_eq!(file.content_hash, "hash2");
    assert_eq!(file.size, 20);
}

#[tokio::test]
async fn delete_file_cascades_chunks_and_embeddings() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::open(dir.path(), 4).unwrap();

    let file_id = storage
        .insert_file("src/a.rs", "hash1", 10, 100, "rust")
        .await
        .unwrap();
    let chunk = test_chunk("c1", file_id, "foo", 1, 3, "fn foo() {}");
    storage.upsert_chunk(chunk.clone()).await.unwrap();
    storage
        .upsert_embedding(&chunk.id, vec![0.1, 0.2, 0.3, 0.4])
        .await
        .unwrap();

    storage.delete_file_by_path("src/a.rs").await.unwrap();

    assert!(storage.get_chunk("c1").await.unwrap().is_none());
    assert!(storage.get_file_by_path("src/a.rs").await.unwrap().is_none());

    let results = storage
        .search_vector(vec![0.1, 0.2, 0.3, 0.4], 10, None)
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn delete_file_by_path_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::open(dir.path(), 4).unwrap();
    storage.delete_file_by_path("does/not/exist.rs").await.unwrap();
    storage.delete_file_by_path("does/not/exist.rs").await.unwrap();
}

#[tokio::test]
async fn chunk_round_trips_all_fields() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::open(dir.path(), 4).unwrap();
    let file_id = storage
        .insert_file("src/a.rs", "hash1", 10, 100, "rust")
        .await
        .unwrap();

    let mut chunk = test_chunk("c1", file_id, "foo", 1, 3, "fn foo() {}");
    chunk.parent_id = None;
    storage.upsert_chunk(chunk.clone()).await.unwrap();

    let fetched = storage.get_chunk("c1").await.unwrap().unwrap();
    assert_eq!(fetched, chunk);
}

#[tokio::test]
async fn vector_search_orders_by_ascending_distance() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::open(dir.path(), 4).unwrap();
    let file_id = storage.insert_file("a.rs", "h", 1, 1, "rust").await.unwrap();

    for (i, mult) in [1.0_f32, 10.0, 100.0].into_iter().enumerate() {
        let chunk = test_chunk(&format!("c{i}"), file_id, "x", 1, 1, "x");
        storage.upsert_chunk(chunk.clone()).await.unwrap();
        storage
            .upsert_embedding(&chunk.id, vec![0.5 * mult; 4])
            .await
            .unwrap();
    }

    let results = storage
        .search_vector(vec![0.5; 4], 3, None)
        .await
        .unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].chunk_id, "c0");
    assert!(results[0].score >= results[1].score);
    assert!(results[1].score >= results[2].score);
}

#[tokio::test]
async fn vector_search_rejects_width_mismatch() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::open(dir.path(), 4).unwrap();
    let result = storage.search_vector(vec![0.1, 0.2], 10, None).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn lexical_search_stems_query_terms() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::open(dir.path(), 4).unwrap();
    let file_id = storage.insert_file("a.rs", "h", 1, 1, "rust").await.unwrap();
    let chunk = test_chunk("c1", file_id, "runner", 1, 1, "running runners ran");
    storage.upsert_chunk(chunk.clone()).await.unwrap();
    storage
        .upsert_lexical(&chunk.id, &chunk.content, &chunk.name, "a.rs")
        .await
        .unwrap();

    let results = storage.search_lexical("run", 10, None).await.unwrap();
    assert!(results.iter().any(|r| r.chunk_id == "c1"));
}

#[tokio::test]
async fn lexical_search_on_empty_query_returns_empty() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::open(dir.path(), 4).unwrap();
    let results = storage.search_lexical("", 10, None).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn populate_fts_rebuilds_from_chunks() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::open(dir.path(), 4).unwrap();
    let file_id = storage.insert_file("a.rs", "h", 1, 1, "rust").await.unwrap();
    let chunk = test_chunk("c1", file_id, "auth", 1, 1, "fn authenticate_user() {}");
    storage.upsert_chunk(chunk).await.unwrap();

    storage
        .populate_fts(tokio_util::sync::CancellationToken::new())
        .await
        .unwrap();

    let results = storage.search_lexical("authenticate", 10, None).await.unwrap();
    assert!(results.iter().any(|r| r.chunk_id == "c1"));
}

#[tokio::test]
async fn subproject_path_must_be_unique() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::open(dir.path(), 4).unwrap();

    let sub = Subproject {
        id: "a".into(),
        path: "packages/frontend".into(),
        name: "frontend".into(),
        marker_file: None,
        language_hint: None,
        auto_detected: false,
        created_at: 0,
        updated_at: 0,
    };
    storage.insert_subproject(sub.clone()).await.unwrap();

    let conflicting = Subproject {
        id: "b".into(),
        ..sub
    };
    let result = storage.insert_subproject(conflicting).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn metadata_round_trips() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::open(dir.path(), 4).unwrap();
    storage.set_metadata("custom.key", "value").await.unwrap();
    assert_eq!(
        storage.get_metadata("custom.key").await.unwrap(),
        Some("value".to_string())
    );
    assert_eq!(storage.get_metadata("missing.key").await.unwrap(), None);
}
