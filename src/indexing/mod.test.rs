use super::*;
use crate::embeddings::MockEmbedder;
use crate::types::Level;
use tempfile::TempDir;

fn pipeline(dir: &std::path::Path) -> (IndexPipeline<MockEmbedder>, Arc<Storage>) {
    let storage = Arc::new(Storage::open(dir, 8).unwrap());
    let cache = Arc::new(EmbeddingCache::new(MockEmbedder::new(8), 100));
    (IndexPipeline::new(storage.clone(), cache, 2), storage)
}

fn source(path: &str, content: &str, modified_at: i64) -> SourceFile {
    SourceFile {
        path: path.to_string(),
        language: "rust".to_string(),
        content: content.to_string(),
        modified_at,
    }
}

#[tokio::test]
async fn indexes_a_new_file_and_writes_chunks() {
    let dir = TempDir::new().unwrap();
    let (pipeline, storage) = pipeline(dir.path());

    let report = pipeline
        .index(
            vec![source("src/lib.rs", "fn main() {}\n", 1)],
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.files_indexed, 1);
    assert_eq!(report.files_failed.len(), 0);
    assert!(report.chunks_written >= 1);

    let file = storage.get_file_by_path("src/lib.rs").await.unwrap().unwrap();
    let ids = storage.chunk_ids_for_file(file.id).await.unwrap();
    assert_eq!(ids.len(), report.chunks_written);
}

#[tokio::test]
async fn unchanged_file_is_skipped_on_reindex() {
    let dir = TempDir::new().unwrap();
    let (pipeline, _storage) = pipeline(dir.path());
    let file = source("src/lib.rs", "fn main() {}\n", 1);

    pipeline.index(vec![file.clone()], CancellationToken::new()).await.unwrap();
    let second = pipeline.index(vec![file], CancellationToken::new()).await.unwrap();

    assert_eq!(second.files_unchanged, 1);
    assert_eq!(second.files_indexed, 0);
}

#[tokio::test]
async fn touching_mtime_with_same_content_preserves_chunk_ids() {
    let dir = TempDir::new().unwrap();
    let (pipeline, storage) = pipeline(dir.path());
    let content = "fn main() {}\n";

    pipeline
        .index(vec![source("src/lib.rs", content, 1)], CancellationToken::new())
        .await
        .unwrap();
    let file = storage.get_file_by_path("src/lib.rs").await.unwrap().unwrap();
    let before = storage.chunk_ids_for_file(file.id).await.unwrap();

    pipeline
        .index(vec![source("src/lib.rs", content, 2)], CancellationToken::new())
        .await
        .unwrap();
    let after = storage.chunk_ids_for_file(file.id).await.unwrap();

    let mut before_sorted = before;
    let mut after_sorted = after;
    before_sorted.sort();
    after_sorted.sort();
    assert_eq!(before_sorted, after_sorted);
}

#[tokio::test]
async fn changed_content_rebuilds_chunks_and_assigns_subproject() {
    let dir = TempDir::new().unwrap();
    let (pipeline, storage) = pipeline(dir.path());
    storage
        .insert_subproject(crate::types::Subproject {
            id: "frontend".into(),
            path: "packages/frontend".into(),
            name: "frontend".into(),
            marker_file: None,
            language_hint: None,
            auto_detected: false,
            created_at: 0,
            updated_at: 0,
        })
        .await
        .unwrap();

    pipeline
        .index(
            vec![source("packages/frontend/app.rs", "fn a() {}\n", 1)],
            CancellationToken::new(),
        )
        .await
        .unwrap();

    let file = storage
        .get_file_by_path("packages/frontend/app.rs")
        .await
        .unwrap()
        .unwrap();
    let ids = storage.chunk_ids_for_file(file.id).await.unwrap();
    let chunks = storage.get_chunks(&ids).await.unwrap();
    let root = chunks.iter().find(|c| c.level == Level::File).unwrap();
    assert_eq!(root.subproject_id.as_deref(), Some("frontend"));
}

#[tokio::test]
async fn per_file_failures_do_not_abort_the_run() {
    let dir = TempDir::new().unwrap();
    let (pipeline, _storage) = pipeline(dir.path());

    let report = pipeline
        .index(
            vec![
                source("a.rs", "fn a() {}\n", 1),
                source("b.rs", "fn b() {}\n", 1),
            ],
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.files_indexed, 2);
    assert!(report.files_failed.is_empty());
}
