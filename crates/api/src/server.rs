//! Server assembly: REST router on the main port, Prometheus exporter on
//! a side port, the same two-listener shape `ApiServer` uses.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use recommend_core::AppConfig;
use recommend_engine::Pipeline;
use recommend_stores::CacheStore;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::auth_middleware;
use crate::rest::{self, AppState};
use crate::swagger::ApiDoc;

pub struct ApiServer {
    config: Arc<AppConfig>,
    pipeline: Arc<Pipeline>,
    cache: Arc<dyn CacheStore>,
}

impl ApiServer {
    pub fn new(config: Arc<AppConfig>, pipeline: Arc<Pipeline>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            config,
            pipeline,
            cache,
        }
    }

    /// Start the HTTP REST server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let state = AppState {
            pipeline: Arc::clone(&self.pipeline),
            cache: Arc::clone(&self.cache),
            config: Arc::clone(&self.config),
            start_time: Instant::now(),
        };

        let recommend_routes = Router::new()
            .route("/recommend/{user_id}", get(rest::recommend))
            .route("/recommend/{user_id}/{category}", get(rest::recommend))
            .route(
                "/intermediate/recommend/{user_id}",
                get(rest::intermediate_recommend),
            )
            .route(
                "/intermediate/recommend/{user_id}/{category}",
                get(rest::intermediate_recommend),
            )
            .route("/popular", get(rest::popular_global))
            .route("/popular/{category}", get(rest::popular_category))
            .route("/latest", get(rest::latest_global))
            .route("/latest/{category}", get(rest::latest_category))
            .route("/item/{id}/neighbors", get(rest::item_neighbors))
            .route(
                "/item/{id}/neighbors/{category}",
                get(rest::item_neighbors),
            )
            .route("/user/{id}/neighbors", get(rest::user_neighbors))
            .layer(middleware::from_fn_with_state(
                Arc::clone(&self.config),
                auth_middleware,
            ))
            .with_state(state.clone());

        let ops_routes = Router::new()
            .route("/health", get(rest::health_check))
            .route("/ready", get(rest::readiness))
            .route("/live", get(rest::liveness))
            .with_state(state);

        let app = Router::new()
            .merge(recommend_routes)
            .merge(ops_routes)
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http());

        let addr = SocketAddr::new(self.config.server.host.parse()?, self.config.server.port);
        info!(addr = %addr, "starting recommend-api HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;
        Ok(())
    }

    /// Start the Prometheus metrics exporter on a separate port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
        let handle = builder
            .with_http_listener(SocketAddr::new(
                self.config.server.host.parse()?,
                self.config.server.metrics_port,
            ))
            .install_recorder()?;

        info!(port = self.config.server.metrics_port, "metrics exporter started");
        std::mem::forget(handle);
        Ok(())
    }
}
