use async_trait::async_trait;
use recommend_core::{Feedback, Item, ItemId, RecommendResult, User, UserId};

/// Users, items, and feedback rows, as required by spec §4.2.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Feedback entries for `user_id`. An empty `types` returns every
    /// feedback type; `with_future = false` excludes rows whose
    /// timestamp is still in the future.
    async fn get_user_feedback(
        &self,
        user_id: &UserId,
        with_future: bool,
        types: &[String],
    ) -> RecommendResult<Vec<Feedback>>;

    async fn get_item(&self, item_id: &ItemId) -> RecommendResult<Option<Item>>;

    async fn get_item_feedback(
        &self,
        item_id: &ItemId,
        types: &[String],
    ) -> RecommendResult<Vec<Feedback>>;

    /// Insert `rows`. With `overwrite = false`, a row whose
    /// `(user_id, item_id, feedback_type)` triple already exists is
    /// skipped rather than replaced. `auto_insert_user`/`auto_insert_item`
    /// create a bare row for a referenced id that doesn't exist yet.
    async fn batch_insert_feedback(
        &self,
        rows: &[Feedback],
        auto_insert_user: bool,
        auto_insert_item: bool,
        overwrite: bool,
    ) -> RecommendResult<()>;

    async fn get_user(&self, user_id: &UserId) -> RecommendResult<Option<User>>;
}
