use super::*;
use crate::config::{EmbeddingConfig, SubprojectDecl, SubprojectsConfig};
use crate::embeddings::MockEmbedder;
use crate::types::{Query, SearchFilters, SearchMode};
use tempfile::TempDir;

fn config() -> PommelConfig {
    PommelConfig {
        embedding: EmbeddingConfig {
            provider: "mock".into(),
            model: "mock-8d".into(),
            dimensions: 8,
        },
        cache_capacity: 100,
        subprojects: SubprojectsConfig::default(),
        fusion: Default::default(),
        indexing: Default::default(),
    }
}

#[tokio::test]
async fn open_index_and_search_round_trip() {
    let dir = TempDir::new().unwrap();
    let engine = PommelEngine::open(dir.path(), MockEmbedder::new(8), config()).await.unwrap();

    let report = engine
        .index(
            vec![SourceFile {
                path: "src/lib.rs".into(),
                language: "rust".into(),
                content: "fn greet() { println!(\"hi\"); }\n".into(),
                modified_at: 1,
            }],
            CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(report.files_indexed, 1);

    let results = engine
        .search(SearchOptions {
            query: Query::Text("greet".into()),
            limit: 5,
            filters: SearchFilters::default(),
            mode: SearchMode::Hybrid,
        })
        .await
        .unwrap();
    assert!(results.iter().any(|r| r.file_path == "src/lib.rs"));
}

#[tokio::test]
async fn reopening_with_a_different_provider_is_rejected() {
    let dir = TempDir::new().unwrap();
    let _engine = PommelEngine::open(dir.path(), MockEmbedder::new(8), config()).await.unwrap();

    let mut other = config();
    other.embedding.provider = "different-provider".into();
    let result = PommelEngine::open(dir.path(), MockEmbedder::new(8), other).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn declared_subprojects_are_registered_on_open() {
    let dir = TempDir::new().unwrap();
    let mut cfg = config();
    cfg.subprojects = SubprojectsConfig {
        auto_detect: false,
        exclude: Vec::new(),
        projects: vec![SubprojectDecl {
            id: "frontend".into(),
            path: "packages/frontend".into(),
            name: "Frontend".into(),
        }],
    };

    let engine = PommelEngine::open(dir.path(), MockEmbedder::new(8), cfg).await.unwrap();
    let subproject = engine.storage().get_subproject("frontend").await.unwrap();
    assert!(subproject.is_some());
}
