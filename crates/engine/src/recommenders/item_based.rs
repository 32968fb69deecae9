use std::collections::HashMap;

use async_trait::async_trait;
use recommend_core::{ItemId, RecommendResult};
use recommend_stores::keys;
use recommend_topk::TopKSelector;

use crate::context::RecommendContext;
use crate::filters::filter_hidden_scores;
use crate::metrics::{StageTimer, ITEM_BASED_RECOMMEND_SECONDS};
use crate::recommender::Recommender;

/// Aggregates candidates from the neighbor lists of every item the user
/// has given feedback on, then Top-K selects the remainder.
pub struct ItemBased;

#[async_trait]
impl Recommender for ItemBased {
    fn name(&self) -> &'static str {
        "item_based"
    }

    async fn run(&self, ctx: &mut RecommendContext) -> RecommendResult<()> {
        if ctx.is_satisfied() {
            return Ok(());
        }
        ctx.require_user_feedback().await?;

        let _timer = StageTimer::start(ITEM_BASED_RECOMMEND_SECONDS);
        let before = ctx.results.len();

        let seed_items: Vec<ItemId> = ctx
            .user_feedback()
            .iter()
            .map(|row| row.item_id.clone())
            .collect();
        let cache_size = ctx.cache_size;
        let category = ctx.category.clone();

        let mut candidates: HashMap<String, f32> = HashMap::new();
        for item_id in seed_items {
            let neighbors = ctx
                .cache
                .get_category_scores(
                    keys::ITEM_NEIGHBORS,
                    item_id.as_str(),
                    &category,
                    0,
                    cache_size - 1,
                )
                .await?;
            let retained = filter_hidden_scores(ctx.cache.as_ref(), neighbors).await;
            for entry in retained {
                let candidate = ItemId::from(entry.id.clone());
                if ctx.exclude_set.contains(&candidate) {
                    continue;
                }
                *candidates.entry(entry.id).or_insert(0.0) += entry.score;
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
