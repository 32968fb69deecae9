use async_trait::async_trait;
use chrono::{DateTime, Utc};
use recommend_core::{RecommendResult, Scored};

/// Keyed store of `(prefix, name) -> ordered scored list` plus a handful
/// of scalar keyspaces, as required by spec §4.1. Implementations rank
/// lists however their producer (an offline job, typically) chose to;
/// this trait never re-sorts anything it returns.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Inclusive `[begin, end]` slice of the named scored list. `end = -1`
    /// means "to the end of the list".
    async fn get_scores(
        &self,
        prefix: &str,
        name: &str,
        begin: i64,
        end: i64,
    ) -> RecommendResult<Vec<Scored>>;

    /// Shorthand for `get_scores` that appends `/category` to `name` when
    /// `category` is non-empty.
    async fn get_category_scores(
        &self,
        prefix: &str,
        name: &str,
        category: &str,
        begin: i64,
        end: i64,
    ) -> RecommendResult<Vec<Scored>> {
        let key = category_key(name, category);
        self.get_scores(prefix, &key, begin, end).await
    }

    /// Positional membership check: `1` if `(prefix, names[i])` exists,
    /// `0` otherwise. Used by the hidden-item filter.
    async fn exists(&self, prefix: &str, names: &[String]) -> RecommendResult<Vec<i32>>;

    /// Append entries to a named scored list, creating it if absent.
    async fn append_scores(
        &self,
        prefix: &str,
        name: &str,
        entries: &[Scored],
    ) -> RecommendResult<()>;

    /// Set a scalar integer keyspace (e.g. a `HiddenItems` flag).
    async fn set_int(&self, prefix: &str, name: &str, value: i64) -> RecommendResult<()>;

    /// Delete a key regardless of its value shape.
    async fn delete(&self, prefix: &str, name: &str) -> RecommendResult<()>;

    /// Set a scalar instant keyspace (e.g. `LastModifyUserTime`).
    async fn set_time(&self, prefix: &str, name: &str, time: DateTime<Utc>) -> RecommendResult<()>;
}

pub fn category_key(name: &str, category: &str) -> String {
    if category.is_empty() {
        name.to_string()
    } else {
        format!("{name}/{category}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_key_empty_category_is_bare_name() {
        assert_eq!(category_key("u1", ""), "u1");
    }

    #[test]
    fn category_key_appends_category() {
        assert_eq!(category_key("u1", "books"), "u1/books");
    }
}
