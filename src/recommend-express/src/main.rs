//! Recommend Express — online recommendation pipeline service.
//!
//! Main entry point that loads configuration, wires a cache/data store
//! pair, and starts the REST and metrics listeners.

use std::sync::Arc;

use clap::Parser;
use recommend_api::ApiServer;
use recommend_cache::RedisCacheStore;
use recommend_core::AppConfig;
use recommend_engine::Pipeline;
use recommend_stores::{CacheStore, MemoryCacheStore, MemoryDataStore};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "recommend-express")]
#[command(about = "Online recommendation pipeline service")]
#[command(version)]
struct Cli {
    /// HTTP port (overrides config)
    #[arg(long, env = "RECOMMEND_EXPRESS__SERVER__PORT")]
    port: Option<u16>,

    /// Metrics port (overrides config)
    #[arg(long, env = "RECOMMEND_EXPRESS__SERVER__METRICS_PORT")]
    metrics_port: Option<u16>,

    /// Use the in-memory reference stores instead of Redis. Useful for
    /// local runs and smoke tests; never set this in production.
    #[arg(long, default_value_t = false)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recommend_express=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("recommend-express starting up");

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(port) = cli.metrics_port {
        config.server.metrics_port = port;
    }
    let config = Arc::new(config);

    info!(
        http_port = config.server.port,
        metrics_port = config.server.metrics_port,
        fallback = ?config.recommend.fallback_recommend,
        "configuration loaded"
    );

    let data = Arc::new(MemoryDataStore::new());
    let cache: Arc<dyn CacheStore> = if cli.in_memory {
        Arc::new(MemoryCacheStore::new())
    } else {
        Arc::new(connect_with_retry("redis", || RedisCacheStore::connect(&config.redis.url)).await?)
    };

    let pipeline = Arc::new(Pipeline::new(
        cache.clone(),
        data,
        &config.recommend.fallback_recommend,
        config.database.cache_size as i64,
        config.database.positive_feedback_type.clone(),
    ));

    let api_server = ApiServer::new(config.clone(), pipeline, cache);

    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "failed to start metrics exporter");
    }

    info!("recommend-express is ready to serve traffic");
    api_server.start_http().await?;

    info!("recommend-express shut down cleanly");
    Ok(())
}

/// Connect to an external service with exponential backoff (3 attempts).
async fn connect_with_retry<T, F, Fut>(service_name: &str, connect_fn: F) -> anyhow::Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<T>>,
{
    let delays = [
        std::time::Duration::from_secs(0),
        std::time::Duration::from_secs(2),
        std::time::Duration::from_secs(4),
    ];
    let mut last_err = None;
    for (attempt, delay) in delays.iter().enumerate() {
        if attempt > 0 {
            warn!(service = service_name, attempt, "retrying connection after {}s", delay.as_secs());
            tokio::time::sleep(*delay).await;
        }
        match connect_fn().await {
            Ok(conn) => {
                info!(service = service_name, "connected successfully");
                return Ok(conn);
            }
            Err(e) => {
                error!(service = service_name, attempt, error = %e, "connection failed");
                last_err = Some(e);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("{} connection failed", service_name)))
}
