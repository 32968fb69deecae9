//! Redis-backed `CacheStore`.
//!
//! Unlike a cache fronting slow-changing user profiles, recommendation
//! lists are read once per request, and the scan-order guarantee has to
//! come from Redis itself, not from a cache-of-a-cache that could serve a
//! stale ordering after a producer rewrite. So this store talks to Redis
//! directly on every call and carries no local tier.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use recommend_core::{RecommendError, RecommendResult, Scored};
use recommend_stores::CacheStore;
use redis::AsyncCommands;
use tracing::info;

fn list_key(prefix: &str, name: &str) -> String {
    format!("{prefix}:{name}")
}

fn map_err(err: redis::RedisError) -> RecommendError {
    RecommendError::Cache(err.to_string())
}

/// Redis-backed cache store. Scored lists live in Sorted Sets keyed by
/// `"{prefix}:{name}"`; members are item/user ids, scores are the ranking
/// scores the producer assigned. Retrieval is `ZREVRANGE ... WITHSCORES`
/// so higher-score members come first, matching every keyspace in the
/// contract ("descending popularity", "descending timestamp", ...).
pub struct RedisCacheStore {
    client: redis::Client,
}

impl RedisCacheStore {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        info!(url = %url, "connecting to redis");
        let client = redis::Client::open(url)?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        info!(response = %pong, "redis connection established");
        Ok(Self { client })
    }

    async fn connection(&self) -> RecommendResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(map_err)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get_scores(
        &self,
        prefix: &str,
        name: &str,
        begin: i64,
        end: i64,
    ) -> RecommendResult<Vec<Scored>> {
        let mut conn = self.connection().await?;
        let key = list_key(prefix, name);
        let raw: Vec<(String, f64)> = conn
            .zrevrange_withscores(&key, begin as isize, end as isize)
            .await
            .map_err(map_err)?;
        Ok(raw
            .into_iter()
            .map(|(id, score)| Scored::new(id, score as f32))
            .collect())
    }

    async fn exists(&self, prefix: &str, names: &[String]) -> RecommendResult<Vec<i32>> {
        let mut conn = self.connection().await?;
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            let key = list_key(prefix, name);
            let present: bool = conn.exists(&key).await.map_err(map_err)?;
            out.push(if present { 1 } else { 0 });
        }
        Ok(out)
    }

    async fn append_scores(
        &self,
        prefix: &str,
        name: &str,
        entries: &[Scored],
    ) -> RecommendResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        let key = list_key(prefix, name);
        let members: Vec<(f64, String)> = entries
            .iter()
            .map(|s| (s.score as f64, s.id.clone()))
            .collect();
        let _: () = conn.zadd_multiple(&key, &members).await.map_err(map_err)?;
        Ok(())
    }

    async fn set_int(&self, prefix: &str, name: &str, value: i64) -> RecommendResult<()> {
        let mut conn = self.connection().await?;
        let key = list_key(prefix, name);
        let _: () = conn.set(&key, value).await.map_err(map_err)?;
        Ok(())
    }

    async fn delete(&self, prefix: &str, name: &str) -> RecommendResult<()> {
        let mut conn = self.connection().await?;
        let key = list_key(prefix, name);
        let _: () = conn.del(&key).await.map_err(map_err)?;
        Ok(())
    }

    async fn set_time(&self, prefix: &str, name: &str, time: DateTime<Utc>) -> RecommendResult<()> {
        self.set_int(prefix, name, time.timestamp()).await
    }
}
