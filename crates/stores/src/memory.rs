use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use recommend_core::{Feedback, Item, ItemId, RecommendResult, Scored, User, UserId};

use crate::cache_store::CacheStore;
use crate::data_store::DataStore;

/// `DashMap`-backed `CacheStore` reference implementation. Scored lists
/// keep producer order; this store never re-sorts them.
#[derive(Default)]
pub struct MemoryCacheStore {
    lists: DashMap<(String, String), Vec<Scored>>,
    ints: DashMap<(String, String), i64>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn list_key(prefix: &str, name: &str) -> (String, String) {
        (prefix.to_string(), name.to_string())
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get_scores(
        &self,
        prefix: &str,
        name: &str,
        begin: i64,
        end: i64,
    ) -> RecommendResult<Vec<Scored>> {
        let key = Self::list_key(prefix, name);
        let Some(list) = self.lists.get(&key) else {
            return Ok(Vec::new());
        };
        let len = list.len() as i64;
        if len == 0 || begin >= len {
            return Ok(Vec::new());
        }
        let start = begin.max(0) as usize;
        let stop = if end < 0 { len } else { (end + 1).min(len) } as usize;
        if start >= stop {
            return Ok(Vec::new());
        }
        Ok(list[start..stop].to_vec())
    }

    async fn exists(&self, prefix: &str, names: &[String]) -> RecommendResult<Vec<i32>> {
        Ok(names
            .iter()
            .map(|name| {
                let key = Self::list_key(prefix, name);
                let present = self.lists.contains_key(&key) || self.ints.contains_key(&key);
                if present { 1 } else { 0 }
            })
            .collect())
    }

    async fn append_scores(
        &self,
        prefix: &str,
        name: &str,
        entries: &[Scored],
    ) -> RecommendResult<()> {
        let key = Self::list_key(prefix, name);
        self.lists.entry(key).or_default().extend_from_slice(entries);
        Ok(())
    }

    async fn set_int(&self, prefix: &str, name: &str, value: i64) -> RecommendResult<()> {
        self.ints.insert(Self::list_key(prefix, name), value);
        Ok(())
    }

    async fn delete(&self, prefix: &str, name: &str) -> RecommendResult<()> {
        let key = Self::list_key(prefix, name);
        self.lists.remove(&key);
        self.ints.remove(&key);
        Ok(())
    }

    async fn set_time(
        &self,
        prefix: &str,
        name: &str,
        time: chrono::DateTime<Utc>,
    ) -> RecommendResult<()> {
        self.set_int(prefix, name, time.timestamp()).await
    }
}

/// `DashMap`-backed `DataStore` reference implementation.
#[derive(Default)]
pub struct MemoryDataStore {
    users: DashMap<UserId, User>,
    items: DashMap<ItemId, Item>,
    feedback: DashMap<(UserId, ItemId, String), Feedback>,
}

impl MemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn user_feedback(&self, user_id: &UserId) -> Vec<Feedback> {
        self.feedback
            .iter()
            .filter(|entry| &entry.key().0 == user_id)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Seed or replace a catalog item directly, bypassing feedback-driven
    /// auto-insert. Used by local/dev bootstrapping and tests that need an
    /// item's categories set up front.
    pub fn put_item(&self, item: Item) {
        self.items.insert(item.item_id.clone(), item);
    }

    /// Seed or replace a user directly, the same way `put_item` seeds items.
    pub fn put_user(&self, user: User) {
        self.users.insert(user.user_id.clone(), user);
    }
}

#[async_trait]
impl DataStore for MemoryDataStore {
    async fn get_user_feedback(
        &self,
        user_id: &UserId,
        with_future: bool,
        types: &[String],
    ) -> RecommendResult<Vec<Feedback>> {
        let now = Utc::now();
        let rows = self
            .user_feedback(user_id)
            .into_iter()
            .filter(|f| with_future || f.timestamp <= now)
            .filter(|f| types.is_empty() || types.contains(&f.feedback_type))
            .collect();
        Ok(rows)
    }

    async fn get_item(&self, item_id: &ItemId) -> RecommendResult<Option<Item>> {
        Ok(self.items.get(item_id).map(|entry| entry.value().clone()))
    }

    async fn get_item_feedback(
        &self,
        item_id: &ItemId,
        types: &[String],
    ) -> RecommendResult<Vec<Feedback>> {
        let rows = self
            .feedback
            .iter()
            .filter(|entry| &entry.key().1 == item_id)
            .map(|entry| entry.value().clone())
            .filter(|f| types.is_empty() || types.contains(&f.feedback_type))
            .collect();
        Ok(rows)
    }

    async fn batch_insert_feedback(
        &self,
        rows: &[Feedback],
        auto_insert_user: bool,
        auto_insert_item: bool,
        overwrite: bool,
    ) -> RecommendResult<()> {
        let mut seen: HashMap<(UserId, ItemId, String), ()> = HashMap::new();
        for row in rows {
            let key = row.key();
            if seen.contains_key(&key) {
                continue;
            }
            seen.insert(key.clone(), ());
            if !overwrite && self.feedback.contains_key(&key) {
                continue;
            }
            if auto_insert_user {
                self.users
                    .entry(row.user_id.clone())
                    .or_insert_with(|| User::new(row.user_id.clone()));
            }
            if auto_insert_item {
                self.items
                    .entry(row.item_id.clone())
                    .or_insert_with(|| Item::new(row.item_id.clone()));
            }
            self.feedback.insert(key, row.clone());
        }
        Ok(())
    }

    async fn get_user(&self, user_id: &UserId) -> RecommendResult<Option<User>> {
        Ok(self.users.get(user_id).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cache_store_append_then_slice_preserves_order() {
        let store = MemoryCacheStore::new();
        store
            .append_scores(
                "PopularItems",
                "",
                &[Scored::new("a", 3.0), Scored::new("b", 2.0), Scored::new("c", 1.0)],
            )
            .await
            .unwrap();
        let got = store.get_scores("PopularItems", "", 0, -1).await.unwrap();
        assert_eq!(
            got.iter().map(|s| s.id.clone()).collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
        let slice = store.get_scores("PopularItems", "", 1, 1).await.unwrap();
        assert_eq!(slice.len(), 1);
        assert_eq!(slice[0].id, "b");
    }

    #[tokio::test]
    async fn cache_store_exists_reports_per_name() {
        let store = MemoryCacheStore::new();
        store.set_int("HiddenItems", "item-1", 1).await.unwrap();
        let got = store
            .exists("HiddenItems", &["item-1".to_string(), "item-2".to_string()])
            .await
            .unwrap();
        assert_eq!(got, vec![1, 0]);
    }

    #[tokio::test]
    async fn data_store_batch_insert_skips_existing_without_overwrite() {
        let store = MemoryDataStore::new();
        let user = UserId::from("u1");
        let item = ItemId::from("i1");
        let first = Feedback::new(user.clone(), item.clone(), "like", Utc::now());
        let mut second = first.clone();
        second.comment = "updated".to_string();

        store
            .batch_insert_feedback(&[first], false, false, false)
            .await
            .unwrap();
        store
            .batch_insert_feedback(&[second], false, false, false)
            .await
            .unwrap();

        let rows = store.get_user_feedback(&user, true, &[]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].comment, "");
    }

    #[tokio::test]
    async fn data_store_auto_insert_creates_referenced_rows() {
        let store = MemoryDataStore::new();
        let user = UserId::from("u1");
        let item = ItemId::from("i1");
        let feedback = Feedback::new(user.clone(), item.clone(), "like", Utc::now());

        store
            .batch_insert_feedback(&[feedback], true, true, false)
            .await
            .unwrap();

        assert!(store.get_user(&user).await.unwrap().is_some());
        assert!(store.get_item(&item).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn data_store_excludes_future_feedback_unless_requested() {
        let store = MemoryDataStore::new();
        let user = UserId::from("u1");
        let future = Feedback::new(
            user.clone(),
            ItemId::from("i1"),
            "like",
            Utc::now() + chrono::Duration::days(1),
        );
        store
            .batch_insert_feedback(&[future], true, true, false)
            .await
            .unwrap();

        let without_future = store.get_user_feedback(&user, false, &[]).await.unwrap();
        assert!(without_future.is_empty());
        let with_future = store.get_user_feedback(&user, true, &[]).await.unwrap();
        assert_eq!(with_future.len(), 1);
    }
}
