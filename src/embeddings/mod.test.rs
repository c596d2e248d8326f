use super::*;

#[tokio::test]
async fn mock_embedder_is_deterministic_and_width_stable() {
    let embedder = MockEmbedder::new(8);
    let a = embedder.embed_single("hello").await.unwrap();
    let b = embedder.embed_single("hello").await.unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 8);

    let batch = embedder
        .embed(&["hello".to_string(), "world".to_string()])
        .await
        .unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0], a);
}
