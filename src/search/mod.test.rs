use super::*;
use crate::embeddings::MockEmbedder;
use crate::types::{Chunk, Level, SearchFilters};
use tempfile::TempDir;

async fn make_searcher(dir: &std::path::Path) -> HybridSearcher<MockEmbedder> {
    let storage = Arc::new(Storage::open(dir, 8).unwrap());
    let cache = Arc::new(EmbeddingCache::new(MockEmbedder::new(8), 100));
    HybridSearcher::new(storage, cache, FusionConfig::default())
}

fn chunk(id: &str, file_id: i64, name: &str, content: &str) -> Chunk {
    Chunk {
        id: id.to_string(),
        file_id,
        level: Level::Method,
        name: name.to_string(),
        start_line: 1,
        end_line: 1,
        content: content.to_string(),
        content_hash: crate::hash::sha256_hex(content.as_bytes()),
        parent_id: None,
        subproject_id: None,
        subproject_path: None,
    }
}

#[tokio::test]
async fn zero_limit_returns_empty_without_touching_indexes() {
    let dir = TempDir::new().unwrap();
    let searcher = make_searcher(dir.path()).await;
    let results = searcher
        .search(SearchOptions {
            query: Query::Text("anything".into()),
            limit: 0,
            filters: SearchFilters::default(),
            mode: SearchMode::Hybrid,
        })
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn hybrid_search_returns_hydrated_results_in_fused_order() {
    let dir = TempDir::new().unwrap();
    let searcher = make_searcher(dir.path()).await;
    let storage = searcher.storage.clone();

    let file_id = storage.insert_file("src/auth.rs", "h", 10, 1, "rust").await.unwrap();
    let c1 = chunk("c1", file_id, "authenticate_user", "fn authenticate_user() {}");
    storage.upsert_chunk(c1.clone()).await.unwrap();
    storage
        .upsert_lexical(&c1.id, &c1.content, &c1.name, "src/auth.rs")
        .await
        .unwrap();
    storage
        .upsert_embedding(&c1.id, vec![0.1; 8])
        .await
        .unwrap();

    let results = searcher
        .search(SearchOptions {
            query: Query::Text("authenticate".into()),
            limit: 5,
            filters: SearchFilters::default(),
            mode: SearchMode::Hybrid,
        })
        .await
        .unwrap();

    assert!(results.iter().any(|r| r.chunk_id == "c1"));
    let hit = results.iter().find(|r| r.chunk_id == "c1").unwrap();
    assert_eq!(hit.file_path, "src/auth.rs");
    assert_eq!(hit.name, "authenticate_user");
}

#[tokio::test]
async fn filtered_search_excludes_non_matching_levels() {
    let dir = TempDir::new().unwrap();
    let searcher = make_searcher(dir.path()).await;
    let storage = searcher.storage.clone();

    let src_file = storage.insert_file("src/a.rs", "h", 1, 1, "rust").await.unwrap();
    let test_file = storage.insert_file("test/b.rs", "h", 1, 1, "rust").await.unwrap();

    for i in 0..10 {
        let mut method = chunk(&format!("m{i}"), src_file, "m", "fn m() {}");
        method.level = Level::Method;
        storage.upsert_chunk(method.clone()).await.unwrap();
        storage
            .upsert_lexical(&method.id, &method.content, &method.name, "src/a.rs")
            .await
            .unwrap();

        let mut file_chunk = chunk(&format!("f{i}"), test_file, "", "whole file");
        file_chunk.level = Level::File;
        storage.upsert_chunk(file_chunk.clone()).await.unwrap();
        storage
            .upsert_lexical(&file_chunk.id, &file_chunk.content, "", "test/b.rs")
            .await
            .unwrap();
    }

    let results = searcher
        .search(SearchOptions {
            query: Query::Text("fn".into()),
            limit: 100,
            filters: SearchFilters {
                levels: Some(vec![Level::Method]),
                path_prefix: Some("src/".into()),
                subproject_id: None,
                chunk_id_allow_list: None,
            },
            mode: SearchMode::Lexical,
        })
        .await
        .unwrap();

    assert_eq!(results.len(), 10);
    assert!(results.iter().all(|r| r.level == Level::Method && r.file_path.starts_with("src/")));
}

#[tokio::test]
async fn empty_filter_candidate_set_short_circuits() {
    let dir = TempDir::new().unwrap();
    let searcher = make_searcher(dir.path()).await;
    let results = searcher
        .search(SearchOptions {
            query: Query::Text("anything".into()),
            limit: 10,
            filters: SearchFilters {
                subproject_id: Some("does-not-exist".into()),
                ..Default::default()
            },
            mode: SearchMode::Hybrid,
        })
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn empty_lexical_query_returns_empty_without_error() {
    let dir = TempDir::new().unwrap();
    let searcher = make_searcher(dir.path()).await;
    let results = searcher
        .search(SearchOptions {
            query: Query::Text("".into()),
            limit: 10,
            filters: SearchFilters::default(),
            mode: SearchMode::Lexical,
        })
        .await
        .unwrap();
    assert!(results.is_empty());
}
