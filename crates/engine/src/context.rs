use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use recommend_core::{Feedback, ItemId, RecommendResult, UserId};
use recommend_stores::{keys, CacheStore, DataStore};

/// Per-request mutable state threaded through the recommender chain.
/// Owned by the pipeline call; each recommender borrows it `&mut` for the
/// duration of its own run and never shares it across tasks.
pub struct RecommendContext {
    pub user_id: UserId,
    pub category: String,
    pub n: usize,
    pub cache_size: i64,
    pub positive_feedback_types: Vec<String>,

    pub cache: Arc<dyn CacheStore>,
    pub data: Arc<dyn DataStore>,

    pub exclude_set: HashSet<ItemId>,
    pub results: Vec<ItemId>,

    user_feedback: Option<Vec<Feedback>>,
    pub stage_counts: Vec<(&'static str, usize)>,
}

impl RecommendContext {
    pub fn new(
        user_id: UserId,
        category: String,
        n: usize,
        cache_size: i64,
        positive_feedback_types: Vec<String>,
        cache: Arc<dyn CacheStore>,
        data: Arc<dyn DataStore>,
    ) -> Self {
        Self {
            user_id,
            category,
            n,
            cache_size,
            positive_feedback_types,
            cache,
            data,
            exclude_set: HashSet::new(),
            results: Vec::new(),
            user_feedback: None,
            stage_counts: Vec::new(),
        }
    }

    /// Seed `exclude_set` from `IgnoreItems(userId)`, keeping only entries
    /// whose score (a Unix-second expiry) is still `<= now`.
    pub async fn seed_exclude_set_from_ignore_items(&mut self) -> RecommendResult<()> {
        let now = Utc::now().timestamp() as f32;
        let ignored = self
            .cache
            .get_scores(keys::IGNORE_ITEMS, self.user_id.as_str(), 0, -1)
            .await?;
        for entry in ignored {
            if entry.score <= now {
                self.exclude_set.insert(ItemId::from(entry.id));
            }
        }
        Ok(())
    }

    pub fn is_satisfied(&self) -> bool {
        self.results.len() >= self.n
    }

    pub fn remaining(&self) -> usize {
        self.n.saturating_sub(self.results.len())
    }

    /// Append `id` unless already excluded, recording it into the
    /// exclusion set either way the id is decided against.
    pub fn try_append(&mut self, id: ItemId) -> bool {
        if self.exclude_set.contains(&id) {
            return false;
        }
        self.exclude_set.insert(id.clone());
        self.results.push(id);
        true
    }

    pub fn record_stage(&mut self, name: &'static str, count: usize) {
        self.stage_counts.push((name, count));
    }

    /// Load `GetUserFeedback(userId, withFuture=false)` once per context,
    /// seeding `exclude_set` with the feedback item ids. Subsequent calls
    /// are no-ops; the loaded rows stay available via `user_feedback`.
    pub async fn require_user_feedback(&mut self) -> RecommendResult<()> {
        if self.user_feedback.is_some() {
            return Ok(());
        }
        let rows = self
            .data
            .get_user_feedback(&self.user_id, false, &[])
            .await?;
        for row in &rows {
            self.exclude_set.insert(row.item_id.clone());
        }
        self.user_feedback = Some(rows);
        Ok(())
    }

    /// The rows loaded by `require_user_feedback`. Panics if called before
    /// that has run at least once for this context.
    pub fn user_feedback(&self) -> &[Feedback] {
        self.user_feedback
            .as_deref()
            .expect("require_user_feedback must run before user_feedback is read")
    }
}
