use async_trait::async_trait;
use recommend_core::RecommendResult;

use crate::context::RecommendContext;

/// A pluggable unit that attempts to extend a request's result list from
/// one source. Implementations never subclass a shared base; the driver
/// dispatches a `Vec<Arc<dyn Recommender>>` built from the configured
/// fallback chain.
#[async_trait]
pub trait Recommender: Send + Sync {
    fn name(&self) -> &'static str;
    async fn run(&self, ctx: &mut RecommendContext) -> RecommendResult<()>;
}
