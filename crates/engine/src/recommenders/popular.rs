use async_trait::async_trait;
use recommend_core::{ItemId, RecommendResult};
use recommend_stores::keys;

use crate::context::RecommendContext;
use crate::filters::filter_hidden_scores;
use crate::metrics::{StageTimer, LOAD_POPULAR_RECOMMEND_CACHE_SECONDS};
use crate::recommender::Recommender;

/// Reads `PopularItems(category)`, the same shape as `Latest` but sourced
/// from the global popularity ranking.
pub struct Popular;

#[async_trait]
impl Recommender for Popular {
    fn name(&self) -> &'static str {
        "popular"
    }

    async fn run(&self, ctx: &mut RecommendContext) -> RecommendResult<()> {
        if ctx.is_satisfied() {
            return Ok(());
        }
        ctx.require_user_feedback().await?;

        let _timer = StageTimer::start(LOAD_POPULAR_RECOMMEND_CACHE_SECONDS);
        let before = ctx.results.len();

        let remaining = ctx.remaining() as i64;
        let category = ctx.category.clone();
        let raw = ctx
            .cache
            .get_scores(keys::POPULAR_ITEMS, &category, 0, remaining - 1)
            .await?;
        let filtered = filter_hidden_scores(ctx.cache.as_ref(), raw).await;
        for entry in filtered {
            if ctx.is_satisfied() {
                break;
            }
            ctx.try_append(ItemId::from(entry.id));
        }

        ctx.record_stage(self.name(), ctx.results.len() - before);
        Ok(())
    }
}
