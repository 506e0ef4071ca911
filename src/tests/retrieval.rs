use tempfile::TempDir;

use super::{open_engine, open_with, test_config, DIMS};
use crate::config::EngineConfig;
use crate::semantic::embeddings::HashingLoader;
use crate::semantic::vector::l2_norm;
use crate::semantic::{LanguageTag, PostRef};

fn scenario_posts() -> Vec<PostRef> {
    vec![
        PostRef::new("p1", "I love cats"),
        PostRef::new("p2", "Dogs are great"),
        PostRef::new("p3", "J'aime les chats"),
    ]
}

#[tokio::test]
async fn test_search_excludes_other_languages() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(dir.path()).await;
    let posts = scenario_posts();

    let report = engine.precompute(posts.clone()).await.unwrap();
    assert_eq!(report.embedded, 3);
    assert_eq!(engine.vector_for(&posts[2]).await.unwrap().language.as_str(), "fr");

    let results = engine.semantic_search("cats", &posts, 2).await;
    assert_eq!(results[0].post_id, "p1");
    assert!(results.iter().all(|r| r.post_id != "p3"));
    assert!(results.len() <= 2);
}

#[tokio::test]
async fn test_search_skips_uncached_candidates() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(dir.path()).await;
    let posts = scenario_posts();
    engine.precompute(vec![posts[1].clone()]).await.unwrap();

    let results = engine.semantic_search("cats", &posts, 5).await;
    assert!(results.iter().all(|r| r.post_id == "p2"));
}

#[tokio::test]
async fn test_search_ranking_deterministic() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(dir.path()).await;
    let posts = vec![
        PostRef::new("a", "cats cats cats and more cats"),
        PostRef::new("b", "my cats sleep all day long"),
        PostRef::new("c", "cats"),
        PostRef::new("d", "the weather is nice for a walk"),
        PostRef::new("e", "cats"),
    ];
    engine.precompute(posts.clone()).await.unwrap();

    let first = engine.semantic_search("cats everywhere", &posts, 10).await;
    let second = engine.semantic_search("cats everywhere", &posts, 10).await;
    assert_eq!(first, second);
    assert!(first.windows(2).all(|w| w[0].score >= w[1].score));

    // identical vectors tie and end up next to each other
    let c = first.iter().position(|r| r.post_id == "c").unwrap();
    let e = first.iter().position(|r| r.post_id == "e").unwrap();
    assert_eq!(first[c].score, first[e].score);
    assert_eq!(c.abs_diff(e), 1);
}

#[tokio::test]
async fn test_related_posts_below_threshold_is_empty() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(dir.path()).await;
    let subject = PostRef::new("p1", "I love cats");
    let candidates = vec![
        PostRef::new("p2", "Dogs are great"),
        PostRef::new("p4", "Birds fly south for winter"),
        PostRef::new("p5", "Stock markets fell today"),
    ];

    let mut all = candidates.clone();
    all.push(subject.clone());
    engine.precompute(all).await.unwrap();

    assert!(engine.related_posts(&subject, &candidates, 5, 0.9).await.is_empty());
}

#[tokio::test]
async fn test_related_posts_language_partition() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(dir.path()).await;
    let subject = PostRef::new("fr1", "J'aime les chats");
    let candidates = vec![
        subject.clone(),
        PostRef::new("en1", "I love cats"),
        PostRef::new("fr2", "Le chat est sur la table"),
    ];
    engine.precompute(candidates.clone()).await.unwrap();

    let results = engine.related_posts(&subject, &candidates, 5, -1.0).await;
    let ids: Vec<&str> = results.iter().map(|r| r.post_id.as_str()).collect();
    assert_eq!(ids, vec!["fr2"]);
}

#[tokio::test]
async fn test_related_posts_without_subject_vector() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(dir.path()).await;
    let candidates = vec![PostRef::new("p2", "Dogs are great")];
    engine.precompute(candidates.clone()).await.unwrap();

    let subject = PostRef::new("p1", "I love cats");
    assert!(engine.related_posts(&subject, &candidates, 5, 0.0).await.is_empty());
}

#[tokio::test]
async fn test_centroid_and_ranking() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(dir.path()).await;
    let liked = vec![
        PostRef::new("l1", "I love cats"),
        PostRef::new("l2", "cats are the best pets"),
        PostRef::new("l3", "J'aime les chats"),
    ];
    let feed = vec![
        PostRef::new("f1", "Stock markets fell today"),
        PostRef::new("f2", "my cats are sleeping"),
    ];
    let mut all = liked.clone();
    all.extend(feed.clone());
    engine.precompute(all).await.unwrap();

    assert!(engine.relevance_centroid(&[], &LanguageTag::new("en")).await.is_none());
    assert!(engine
        .relevance_centroid(&liked, &LanguageTag::new("ja"))
        .await
        .is_none());

    let centroid = engine
        .relevance_centroid(&liked, &LanguageTag::new("en"))
        .await
        .unwrap();
    assert_eq!(centroid.sample_count, 2);
    assert!((l2_norm(&centroid.vector) - 1.0).abs() < 1e-5);

    let ranked = engine.rank_by_centroid(&centroid, &feed, 10).await;
    assert_eq!(ranked[0].post_id, "f2");
}

#[tokio::test]
async fn test_vectors_are_unit_length_and_recompute_is_stable() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(dir.path()).await;
    let posts = vec![
        PostRef::new("p1", "Check https://example.com/cats by @someone.bsky.social"),
        PostRef::new("p2", "quoting this").with_quote("a very long quoted post about birds"),
    ];
    engine.precompute(posts.clone()).await.unwrap();

    let before = engine.vector_for(&posts[0]).await.unwrap();
    for post in &posts {
        let record = engine.vector_for(post).await.unwrap();
        assert_eq!(record.dimensions(), DIMS);
        assert!((l2_norm(&record.vector) - 1.0).abs() < 1e-5);
    }

    let report = engine.recompute_posts(vec![posts[0].clone()]).finished().await.unwrap();
    assert_eq!(report.embedded, 1);
    let after = engine.vector_for(&posts[0]).await.unwrap();
    assert_eq!(before.vector, after.vector);
    assert_eq!(before.language, after.language);
}

#[tokio::test]
async fn test_missing_model_skips_post_only() {
    let dir = TempDir::new().unwrap();
    let engine = open_with(
        test_config(),
        dir.path(),
        HashingLoader::for_languages(DIMS, ["en"]),
    )
    .await;
    let posts = scenario_posts();

    let report = engine.precompute(posts.clone()).await.unwrap();
    assert_eq!(report.embedded, 2);
    assert_eq!(report.failed, 1);
    assert!(engine.vector_for(&posts[2]).await.is_none());

    assert_eq!(engine.semantic_search("cats", &posts, 2).await[0].post_id, "p1");
}

#[tokio::test]
async fn test_memory_eviction_then_hydration() {
    let dir = TempDir::new().unwrap();
    let config = EngineConfig {
        memory_capacity: 3,
        ..test_config()
    };
    let engine = open_with(config, dir.path(), HashingLoader::new(DIMS)).await;
    let posts: Vec<PostRef> = (1..=4)
        .map(|i| PostRef::new(format!("p{i}"), format!("post number {i}")))
        .collect();

    engine.precompute(posts.clone()).await.unwrap();
    let stats = engine.stats();
    assert_eq!(stats.memory_entries, 3);
    assert_eq!(stats.stored_records, 4);

    // p1 was evicted from memory but is still on disk
    assert!(engine.vector_for(&posts[0]).await.is_some());
    assert_eq!(engine.stats().memory_entries, 3);
}

#[tokio::test]
async fn test_cancel_stops_batch_at_item_boundary() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(dir.path()).await;
    let posts: Vec<PostRef> = (0..200)
        .map(|i| PostRef::new(format!("p{i}"), format!("post {i} on some topic")))
        .collect();

    let batch = engine.embed_posts(posts);
    batch.cancel();
    let report = batch.finished().await.unwrap();

    assert!(report.cancelled || report.embedded == 200);
    assert_eq!(engine.stats().stored_records, report.embedded);
}

#[tokio::test]
async fn test_search_served_while_batch_runs() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(dir.path()).await;
    let posts = scenario_posts();
    engine.precompute(posts.clone()).await.unwrap();

    let backlog: Vec<PostRef> = (0..500)
        .map(|i| PostRef::new(format!("b{i}"), format!("background post {i}")))
        .collect();
    let batch = engine.embed_posts(backlog);

    let results = engine.semantic_search("cats", &posts, 2).await;
    assert_eq!(results[0].post_id, "p1");

    let report = batch.finished().await.unwrap();
    assert_eq!(report.embedded, 500);
}
