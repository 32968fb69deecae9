use std::time::Instant;

/// RAII stage timer: records the elapsed time to the named histogram when
/// dropped.
pub struct StageTimer {
    metric: &'static str,
    start: Instant,
}

impl StageTimer {
    pub fn start(metric: &'static str) -> Self {
        Self {
            metric,
            start: Instant::now(),
        }
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        metrics::histogram!(self.metric).record(self.start.elapsed().as_secs_f64());
    }
}

pub const LOAD_OFFLINE_RECOMMEND_CACHE_SECONDS: &str = "LoadCTRRecommendCacheSeconds";
pub const LOAD_COLLABORATIVE_RECOMMEND_CACHE_SECONDS: &str =
    "LoadCollaborativeRecommendCacheSeconds";
pub const USER_BASED_RECOMMEND_SECONDS: &str = "UserBasedRecommendSeconds";
pub const ITEM_BASED_RECOMMEND_SECONDS: &str = "ItemBasedRecommendSeconds";
pub const LOAD_LATEST_RECOMMEND_CACHE_SECONDS: &str = "LoadLatestRecommendCacheSeconds";
pub const LOAD_POPULAR_RECOMMEND_CACHE_SECONDS: &str = "LoadPopularRecommendCacheSeconds";
pub const GET_RECOMMEND_SECONDS: &str = "GetRecommendSeconds";
pub const RECOMMEND_STAGE_ITEM_COUNT: &str = "RecommendStageItemCount";
