use std::sync::Arc;
use std::time::Instant;

use chrono::{Duration, Utc};
use recommend_core::{Feedback, ItemId, RecommendError, RecommendResult, Scored, UserId};
use recommend_stores::{keys, CacheStore, DataStore};
use tracing::debug;

use crate::context::RecommendContext;
use crate::metrics::{GET_RECOMMEND_SECONDS, RECOMMEND_STAGE_ITEM_COUNT};
use crate::recommender::Recommender;
use crate::recommenders::{Collaborative, ItemBased, Latest, Offline, Popular, UserBased};

fn resolve_fallback(name: &str) -> RecommendResult<Arc<dyn Recommender>> {
    match name {
        "collaborative" => Ok(Arc::new(Collaborative)),
        "item_based" => Ok(Arc::new(ItemBased)),
        "user_based" => Ok(Arc::new(UserBased)),
        "latest" => Ok(Arc::new(Latest)),
        "popular" => Ok(Arc::new(Popular)),
        other => Err(RecommendError::UnknownFallback(other.to_string())),
    }
}

/// Owns the two store trait objects and the configured fallback chain.
/// A single long-lived value constructed once at startup; no process-wide
/// mutable singletons beyond the `metrics` crate's global recorder.
///
/// The fallback names are kept unresolved until `recommend()` runs so a
/// misconfigured `Recommend.FallbackRecommend` entry surfaces as a
/// per-request `RecommendError::UnknownFallback` (mapped to a 500 at the
/// API boundary) rather than aborting the process at startup.
pub struct Pipeline {
    cache: Arc<dyn CacheStore>,
    data: Arc<dyn DataStore>,
    fallback_recommend: Vec<String>,
    cache_size: i64,
    positive_feedback_types: Vec<String>,
}

impl Pipeline {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        data: Arc<dyn DataStore>,
        fallback_recommend: &[String],
        cache_size: i64,
        positive_feedback_types: Vec<String>,
    ) -> Self {
        Self {
            cache,
            data,
            fallback_recommend: fallback_recommend.to_vec(),
            cache_size,
            positive_feedback_types,
        }
    }

    /// Run the pipeline for `(userId, category)`, returning up to `offset +
    /// n` ids with the first `offset` dropped. No stable cursor is promised
    /// across calls (§4.8).
    pub async fn recommend(
        &self,
        user_id: &UserId,
        category: &str,
        n: usize,
        offset: usize,
    ) -> RecommendResult<Vec<ItemId>> {
        let start = Instant::now();
        let target = offset + n;

        let mut ctx = RecommendContext::new(
            user_id.clone(),
            category.to_string(),
            target,
            self.cache_size,
            self.positive_feedback_types.clone(),
            Arc::clone(&self.cache),
            Arc::clone(&self.data),
        );
        ctx.seed_exclude_set_from_ignore_items().await?;

        let mut recommenders: Vec<Arc<dyn Recommender>> = vec![Arc::new(Offline)];
        for name in &self.fallback_recommend {
            recommenders.push(resolve_fallback(name)?);
        }

        for recommender in &recommenders {
            if ctx.is_satisfied() {
                break;
            }
            recommender.run(&mut ctx).await?;
        }

        for (stage, count) in &ctx.stage_counts {
            metrics::counter!(RECOMMEND_STAGE_ITEM_COUNT, "stage" => *stage).increment(*count as u64);
        }
        debug!(user_id = %user_id.as_str(), category, stage_counts = ?ctx.stage_counts, "recommend stage counts");

        ctx.results.truncate(target);
        let page = ctx.results.into_iter().skip(offset).collect();

        metrics::histogram!(GET_RECOMMEND_SECONDS).record(start.elapsed().as_secs_f64());
        Ok(page)
    }

    /// Best-effort write-back (§4.7): for each returned item, insert a
    /// synthetic feedback row and mirror it into `IgnoreItems`. A failure at
    /// either store aborts the remaining write-backs; items already
    /// returned to the caller are unaffected.
    pub async fn write_back(
        &self,
        user_id: &UserId,
        items: &[ItemId],
        feedback_type: &str,
        delay_minutes: i64,
    ) -> RecommendResult<()> {
        let expiry = Utc::now() + Duration::minutes(delay_minutes);
        for item_id in items {
            let row = Feedback::new(user_id.clone(), item_id.clone(), feedback_type, expiry);
            self.data
                .batch_insert_feedback(std::slice::from_ref(&row), false, false, false)
                .await
                .map_err(|e| RecommendError::WriteBack(e.to_string()))?;
            self.cache
                .append_scores(
                    keys::IGNORE_ITEMS,
                    user_id.as_str(),
                    &[Scored::new(item_id.as_str(), expiry.timestamp() as f32)],
                )
                .await
                .map_err(|e| RecommendError::WriteBack(e.to_string()))?;
        }
        Ok(())
    }
}
