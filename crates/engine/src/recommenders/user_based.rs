use std::collections::HashMap;

use async_trait::async_trait;
use recommend_core::{ItemId, RecommendResult};
use recommend_stores::keys;
use recommend_topk::TopKSelector;

use crate::context::RecommendContext;
use crate::filters::filter_hidden_ids;
use crate::metrics::{StageTimer, USER_BASED_RECOMMEND_SECONDS};
use crate::recommender::Recommender;

/// Aggregates candidates from the feedback of the user's nearest neighbors,
/// weighted by neighbor similarity, then Top-K selects the remainder.
pub struct UserBased;

#[async_trait]
impl Recommender for UserBased {
    fn name(&self) -> &'static str {
        "user_based"
    }

    async fn run(&self, ctx: &mut RecommendContext) -> RecommendResult<()> {
        if ctx.is_satisfied() {
            return Ok(());
        }
        ctx.require_user_feedback().await?;

        let _timer = StageTimer::start(USER_BASED_RECOMMEND_SECONDS);
        let before = ctx.results.len();

        let neighbors = ctx
            .cache
            .get_scores(keys::USER_NEIGHBORS, ctx.user_id.as_str(), 0, ctx.cache_size - 1)
            .await?;

        let mut candidates: HashMap<String, f32> = HashMap::new();
        for neighbor in neighbors {
            let similarity = neighbor.score;
            let rows = ctx
                .data
                .get_user_feedback(
                    &neighbor.id.clone().into(),
                    false,
                    &ctx.positive_feedback_types,
                )
                .await?;
            let candidate_ids: Vec<ItemId> = rows.iter().map(|row| row.item_id.clone()).collect();
            let retained = filter_hidden_ids(ctx.cache.as_ref(), candidate_ids).await;
            for item_id in retained {
                if ctx.exclude_set.contains(&item_id) {
                    continue;
                }
                if !ctx.category.is_empty() {
                    let Some(item) = ctx.data.get_item(&item_id).await? else {
                        continue;
                    };
                    if !item.in_category(&ctx.category) {
                        continue;
                    }
                }
                *candidates.entry(item_id.0).or_insert(0.0) += similarity;
            }
        }

        let mut selector = TopKSelector::new(ctx.remaining());
        for (id, score) in candidates {
            selector.push(id, score);
        }
        for (id, _score) in selector.pop_all() {
            ctx.try_append(ItemId::from(id));
        }

        ctx.record_stage(self.name(), ctx.results.len() - before);
        Ok(())
    }
}
