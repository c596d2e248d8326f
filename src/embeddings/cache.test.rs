use super::*;
use crate::embeddings::MockEmbedder;

#[tokio::test]
async fn single_hit_does_not_call_embedder_again() {
    let cache = EmbeddingCache::new(MockEmbedder::new(4), 10);
    let first = cache.embed_single("fn main() {}").await.unwrap();
    let second = cache.embed_single("fn main() {}").await.unwrap();
    assert_eq!(first, second);

    let metrics = cache.metrics();
    assert_eq!(metrics.misses, 1);
    assert_eq!(metrics.hits, 1);
    assert_eq!(metrics.size, 1);
}

#[tokio::test]
async fn batch_calls_embedder_once_with_only_misses() {
    let cache = EmbeddingCache::new(MockEmbedder::new(4), 200);

    let preload: Vec<String> = (0..50).map(|i| format!("t{i}")).collect();
    cache.embed(&preload).await.unwrap();

    let fresh: Vec<String> = (0..50).map(|i| format!("u{i}")).collect();
    let mixed: Vec<String> = preload.iter().cloned().chain(fresh.iter().cloned()).collect();

    let output = cache.embed(&mixed).await.unwrap();

    assert_eq!(output.len(), 100);
    let metrics = cache.metrics();
    assert_eq!(metrics.size, 100);
    assert_eq!(metrics.misses, 50);
    assert_eq!(metrics.hits, 50);

    for (i, text) in mixed.iter().enumerate() {
        let direct = MockEmbedder::new(4).embed_single(text).await.unwrap();
        assert_eq!(output[i], direct);
    }
}

#[tokio::test]
async fn batch_with_no_misses_never_calls_underlying_embedder() {
    let cache = EmbeddingCache::new(MockEmbedder::new(4), 10);
    let texts = vec!["a".to_string(), "b".to_string()];
    cache.embed(&texts).await.unwrap();
    assert_eq!(cache.metrics().misses, 2);

    // Second call is all hits; misses must not increase.
    cache.embed(&texts).await.unwrap();
    assert_eq!(cache.metrics().misses, 2);
    assert_eq!(cache.metrics().hits, 2);
}

#[tokio::test]
async fn capacity_overflow_evicts_least_recently_used() {
    let cache = EmbeddingCache::new(MockEmbedder::new(4), 2);
    cache.embed_single("a").await.unwrap();
    cache.embed_single("b").await.unwrap();
    // touch "a" so "b" becomes the least recently used entry.
    cache.embed_single("a").await.unwrap();
    cache.embed_single("c").await.unwrap();

    let metrics = cache.metrics();
    assert_eq!(metrics.size, 2);
    assert_eq!(metrics.evictions, 1);
}

#[tokio::test]
async fn preserves_order_and_length_of_input() {
    let cache = EmbeddingCache::new(MockEmbedder::new(4), 10);
    let texts = vec!["x".to_string(), "y".to_string(), "x".to_string()];
    let output = cache.embed(&texts).await.unwrap();
    assert_eq!(output.len(), 3);
    assert_eq!(output[0], output[2]);
}
