//! End-to-end pipeline scenarios, run against the in-memory reference
//! backends. Mirrors the concrete scenarios worked through alongside the
//! rest of the store/recommender contracts.

use std::sync::Arc;

use chrono::Utc;
use recommend_core::{Feedback, Item, ItemId, Scored, UserId};
use recommend_engine::Pipeline;
use recommend_stores::{keys, CacheStore, DataStore, MemoryCacheStore, MemoryDataStore};

fn pipeline(
    cache: Arc<MemoryCacheStore>,
    data: Arc<MemoryDataStore>,
    fallback: &[&str],
) -> Pipeline {
    let fallback: Vec<String> = fallback.iter().map(|s| s.to_string()).collect();
    Pipeline::new(cache, data, &fallback, 100, vec!["like".to_string()])
}

#[tokio::test]
async fn offline_hits_fully() {
    let cache = Arc::new(MemoryCacheStore::new());
    let data = Arc::new(MemoryDataStore::new());
    cache
        .append_scores(
            keys::OFFLINE_RECOMMEND,
            "u1",
            &[
                Scored::new("a", 9.0),
                Scored::new("b", 8.0),
                Scored::new("c", 7.0),
                Scored::new("d", 6.0),
            ],
        )
        .await
        .unwrap();

    let pipeline = pipeline(cache, data, &["latest"]);
    let got = pipeline.recommend(&UserId::from("u1"), "", 3, 0).await.unwrap();
    assert_eq!(
        got.into_iter().map(|i| i.0).collect::<Vec<_>>(),
        vec!["a", "b", "c"]
    );
}

#[tokio::test]
async fn offline_partial_latest_fills() {
    let cache = Arc::new(MemoryCacheStore::new());
    let data = Arc::new(MemoryDataStore::new());
    cache
        .append_scores(keys::OFFLINE_RECOMMEND, "u1", &[Scored::new("a", 9.0)])
        .await
        .unwrap();
    cache
        .append_scores(
            keys::LATEST_ITEMS,
            "",
            &[Scored::new("b", 5.0), Scored::new("c", 4.0)],
        )
        .await
        .unwrap();

    let pipeline = pipeline(cache, data, &["latest"]);
    let got = pipeline.recommend(&UserId::from("u1"), "", 3, 0).await.unwrap();
    assert_eq!(
        got.into_iter().map(|i| i.0).collect::<Vec<_>>(),
        vec!["a", "b", "c"]
    );
}

#[tokio::test]
async fn hidden_items_are_filtered_out() {
    let cache = Arc::new(MemoryCacheStore::new());
    let data = Arc::new(MemoryDataStore::new());
    cache
        .append_scores(
            keys::OFFLINE_RECOMMEND,
            "u1",
            &[Scored::new("a", 9.0), Scored::new("b", 8.0), Scored::new("c", 7.0)],
        )
        .await
        .unwrap();
    cache.set_int(keys::HIDDEN_ITEMS, "b", 1).await.unwrap();
    cache
        .append_scores(keys::POPULAR_ITEMS, "", &[Scored::new("d", 1.0)])
        .await
        .unwrap();

    let pipeline = pipeline(cache, data, &["popular"]);
    let got = pipeline.recommend(&UserId::from("u1"), "", 3, 0).await.unwrap();
    assert_eq!(
        got.into_iter().map(|i| i.0).collect::<Vec<_>>(),
        vec!["a", "c", "d"]
    );
}

#[tokio::test]
async fn ignored_items_are_excluded() {
    let cache = Arc::new(MemoryCacheStore::new());
    let data = Arc::new(MemoryDataStore::new());
    let now = Utc::now().timestamp() as f32;
    cache
        .append_scores(keys::IGNORE_ITEMS, "u1", &[Scored::new("a", now - 10.0)])
        .await
        .unwrap();
    cache
        .append_scores(
            keys::OFFLINE_RECOMMEND,
            "u1",
            &[Scored::new("a", 9.0), Scored::new("b", 8.0)],
        )
        .await
        .unwrap();
    cache
        .append_scores(keys::POPULAR_ITEMS, "", &[Scored::new("c", 1.0)])
        .await
        .unwrap();

    let pipeline = pipeline(cache, data, &["popular"]);
    let got = pipeline.recommend(&UserId::from("u1"), "", 2, 0).await.unwrap();
    assert_eq!(
        got.into_iter().map(|i| i.0).collect::<Vec<_>>(),
        vec!["b", "c"]
    );
}

#[tokio::test]
async fn user_based_respects_category() {
    let cache = Arc::new(MemoryCacheStore::new());
    let data = Arc::new(MemoryDataStore::new());

    cache
        .append_scores(keys::USER_NEIGHBORS, "u1", &[Scored::new("v", 0.7)])
        .await
        .unwrap();

    let mut item_x = Item::new(ItemId::from("x"));
    item_x.categories.insert("books".to_string());
    data.put_item(item_x);
    let mut item_y = Item::new(ItemId::from("y"));
    item_y.categories.insert("music".to_string());
    data.put_item(item_y);

    let t = Utc::now();
    data.batch_insert_feedback(
        &[
            Feedback::new(UserId::from("v"), ItemId::from("x"), "like", t),
            Feedback::new(UserId::from("v"), ItemId::from("y"), "like", t),
        ],
        true,
        true,
        false,
    )
    .await
    .unwrap();

    let pipeline = pipeline(cache, data, &["user_based"]);
    let got = pipeline
        .recommend(&UserId::from("u1"), "books", 5, 0)
        .await
        .unwrap();
    assert_eq!(got, vec![ItemId::from("x")]);
}

#[tokio::test]
async fn unknown_fallback_fails_per_request_not_at_construction() {
    let cache = Arc::new(MemoryCacheStore::new());
    let data = Arc::new(MemoryDataStore::new());

    // Construction never validates fallback names; only `recommend` does.
    let pipeline = pipeline(cache, data, &["not_a_real_recommender"]);
    let err = pipeline
        .recommend(&UserId::from("u1"), "", 3, 0)
        .await
        .unwrap_err();
    assert!(err.is_internal());
}

#[tokio::test]
async fn write_back_marks_items_ignored() {
    let cache = Arc::new(MemoryCacheStore::new());
    let data = Arc::new(MemoryDataStore::new());
    cache
        .append_scores(
            keys::POPULAR_ITEMS,
            "",
            &[Scored::new("a", 1.0), Scored::new("b", 1.0)],
        )
        .await
        .unwrap();

    let pipeline = pipeline(cache, data, &["popular"]);
    let user = UserId::from("u1");
    let got = pipeline.recommend(&user, "", 2, 0).await.unwrap();
    assert_eq!(got, vec![ItemId::from("a"), ItemId::from("b")]);

    pipeline.write_back(&user, &got, "impression", 0).await.unwrap();

    let ignored = pipeline
        .recommend(&user, "", 2, 0)
        .await
        .unwrap();
    // Both items are now in IgnoreItems with an expiry at ~now, so an
    // immediate re-run (same instant, score <= now) excludes them again;
    // with no other source configured the result is empty.
    assert!(ignored.is_empty());
}
