use recommend_core::{ItemId, Scored};
use recommend_stores::{keys, CacheStore};
use tracing::warn;

/// Drop scored entries flagged in `HiddenItems`. Fail-open: a cache error
/// is logged and the unfiltered input is returned, trading invariance for
/// availability (see the hidden-filter design note).
pub async fn filter_hidden_scores(cache: &dyn CacheStore, items: Vec<Scored>) -> Vec<Scored> {
    if items.is_empty() {
        return items;
    }
    let ids: Vec<String> = items.iter().map(|s| s.id.clone()).collect();
    match cache.exists(keys::HIDDEN_ITEMS, &ids).await {
        Ok(flags) => items
            .into_iter()
            .zip(flags)
            .filter(|(_, flag)| *flag == 0)
            .map(|(item, _)| item)
            .collect(),
        Err(err) => {
            warn!(error = %err, "hidden-item check failed, returning unfiltered list");
            items
        }
    }
}

/// Same policy, applied to a list of item ids rather than scored entries.
pub async fn filter_hidden_ids(cache: &dyn CacheStore, ids: Vec<ItemId>) -> Vec<ItemId> {
    if ids.is_empty() {
        return ids;
    }
    let names: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    match cache.exists(keys::HIDDEN_ITEMS, &names).await {
        Ok(flags) => ids
            .into_iter()
            .zip(flags)
            .filter(|(_, flag)| *flag == 0)
            .map(|(id, _)| id)
            .collect(),
        Err(err) => {
            warn!(error = %err, "hidden-item check failed, returning unfiltered list");
            ids
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use recommend_core::RecommendResult;

    struct AlwaysHidden;
    struct AlwaysErrors;

    #[async_trait]
    impl CacheStore for AlwaysHidden {
        async fn get_scores(&self, _: &str, _: &str, _: i64, _: i64) -> RecommendResult<Vec<Scored>> {
            Ok(Vec::new())
        }
        async fn exists(&self, _: &str, names: &[String]) -> RecommendResult<Vec<i32>> {
            Ok(names.iter().map(|_| 1).collect())
        }
        async fn append_scores(&self, _: &str, _: &str, _: &[Scored]) -> RecommendResult<()> {
            Ok(())
        }
        async fn set_int(&self, _: &str, _: &str, _: i64) -> RecommendResult<()> {
            Ok(())
        }
        async fn delete(&self, _: &str, _: &str) -> RecommendResult<()> {
            Ok(())
        }
        async fn set_time(&self, _: &str, _: &str, _: DateTime<Utc>) -> RecommendResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl CacheStore for AlwaysErrors {
        async fn get_scores(&self, _: &str, _: &str, _: i64, _: i64) -> RecommendResult<Vec<Scored>> {
            Ok(Vec::new())
        }
        async fn exists(&self, _: &str, _: &[String]) -> RecommendResult<Vec<i32>> {
            Err(recommend_core::RecommendError::Cache("down".to_string()))
        }
        async fn append_scores(&self, _: &str, _: &str, _: &[Scored]) -> RecommendResult<()> {
            Ok(())
        }
        async fn set_int(&self, _: &str, _: &str, _: i64) -> RecommendResult<()> {
            Ok(())
        }
        async fn delete(&self, _: &str, _: &str) -> RecommendResult<()> {
            Ok(())
        }
        async fn set_time(&self, _: &str, _: &str, _: DateTime<Utc>) -> RecommendResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn drops_hidden_entries() {
        let store = AlwaysHidden;
        let out = filter_hidden_scores(&store, vec![Scored::new("a", 1.0)]).await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn fails_open_on_cache_error() {
        let store = AlwaysErrors;
        let out = filter_hidden_scores(&store, vec![Scored::new("a", 1.0)]).await;
        assert_eq!(out.len(), 1);
    }
}
