use async_trait::async_trait;
use recommend_core::{ItemId, RecommendResult};
use recommend_stores::keys;

use crate::context::RecommendContext;
use crate::filters::filter_hidden_scores;
use crate::metrics::{StageTimer, LOAD_OFFLINE_RECOMMEND_CACHE_SECONDS};
use crate::recommender::Recommender;

/// Reads `OfflineRecommend(userId, category)`, the precomputed
/// recommendation list from the offline model.
pub struct Offline;

#[async_trait]
impl Recommender for Offline {
    fn name(&self) -> &'static str {
        "offline"
    }

    async fn run(&self, ctx: &mut RecommendContext) -> RecommendResult<()> {
        if ctx.is_satisfied() {
            return Ok(());
        }
        let _timer = StageTimer::start(LOAD_OFFLINE_RECOMMEND_CACHE_SECONDS);
        let before = ctx.results.len();

        let category = ctx.category.clone();
        let raw = ctx
            .cache
            .get_category_scores(
                keys::OFFLINE_RECOMMEND,
                ctx.user_id.as_str(),
                &category,
                0,
                ctx.cache_size - 1,
            )
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
