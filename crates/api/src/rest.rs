//! REST handlers for the recommendation endpoint and its auxiliary
//! scored-list siblings, plus operational probes.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use recommend_core::{AppConfig, ItemId, RecommendError, UserId};
use recommend_engine::Pipeline;
use recommend_stores::{keys, CacheStore};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub cache: Arc<dyn CacheStore>,
    pub config: Arc<AppConfig>,
    pub start_time: Instant,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

fn error_response(err: RecommendError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        RecommendError::BadRequest(_) => StatusCode::BAD_REQUEST,
        RecommendError::Unauthorized => StatusCode::UNAUTHORIZED,
        RecommendError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let code = match &err {
        RecommendError::BadRequest(_) => "bad_request",
        RecommendError::Unauthorized => "unauthorized",
        RecommendError::NotFound(_) => "not_found",
        _ => "internal_error",
    };
    if err.is_internal() {
        error!(error = %err, "request failed");
    }
    (
        status,
        Json(ErrorResponse {
            error: code.to_string(),
            message: err.to_string(),
        }),
    )
}

#[derive(Deserialize)]
pub struct RecommendQuery {
    n: Option<usize>,
    offset: Option<usize>,
    #[serde(rename = "write-back-type")]
    write_back_type: Option<String>,
    #[serde(rename = "write-back-delay")]
    write_back_delay: Option<i64>,
}

/// `GET /recommend/{user-id}` and `GET /recommend/{user-id}/{category}`.
#[utoipa::path(
    get,
    path = "/recommend/{user_id}",
    tag = "Recommend",
    params(
        ("user_id" = String, Path, description = "Opaque user identifier"),
        ("n" = Option<usize>, Query, description = "Result count, defaults to Server.DefaultN"),
        ("offset" = Option<usize>, Query, description = "Number of leading results to drop"),
        ("write-back-type" = Option<String>, Query, description = "Feedback type to synthesize for returned items"),
        ("write-back-delay" = Option<i64>, Query, description = "Minutes until the write-back ignore entry takes effect"),
    ),
    responses(
        (status = 200, description = "Ordered item ids", body = Vec<String>),
        (status = 400, description = "Malformed query parameter", body = ErrorResponse),
        (status = 401, description = "Missing or invalid X-API-Key", body = ErrorResponse),
        (status = 500, description = "Downstream store error or unknown fallback recommender", body = ErrorResponse),
    ),
)]
pub async fn recommend(
    State(state): State<AppState>,
    Path(params): Path<Vec<String>>,
    Query(query): Query<RecommendQuery>,
) -> Result<Json<Vec<String>>, (StatusCode, Json<ErrorResponse>)> {
    let (user_id, category) = split_user_and_category(&params);
    let n = query.n.unwrap_or(state.config.server.default_n);
    let offset = query.offset.unwrap_or(0);

    let items = state
        .pipeline
        .recommend(&UserId::from(user_id), &category, n, offset)
        .await
        .map_err(error_response)?;

    if let Some(write_back_type) = query.write_back_type.filter(|t| !t.is_empty()) {
        let delay = query.write_back_delay.unwrap_or(0);
        state
            .pipeline
            .write_back(
                &UserId::from(params[0].clone()),
                &items,
                &write_back_type,
                delay,
            )
            .await
            .map_err(error_response)?;
    }

    Ok(Json(items.into_iter().map(|id: ItemId| id.0).collect()))
}

fn split_user_and_category(params: &[String]) -> (String, String) {
    match params {
        [user_id] => (user_id.clone(), String::new()),
        [user_id, category] => (user_id.clone(), category.clone()),
        _ => (String::new(), String::new()),
    }
}

#[derive(Deserialize)]
pub struct ScoredListQuery {
    n: Option<usize>,
    offset: Option<usize>,
}

#[derive(Serialize, ToSchema)]
pub struct ScoredItem {
    id: String,
    score: f32,
}

/// Shared implementation for `/popular[/{category}]`, `/latest[/{category}]`,
/// `/item/{id}/neighbors[/{category}]`, `/user/{id}/neighbors`: authenticate,
/// parse paging, call `GetScores`, return the list.
async fn scored_list(
    state: &AppState,
    prefix: &str,
    name: &str,
    query: ScoredListQuery,
) -> Result<Json<Vec<ScoredItem>>, (StatusCode, Json<ErrorResponse>)> {
    let n = query.n.unwrap_or(state.config.server.default_n) as i64;
    let offset = query.offset.unwrap_or(0) as i64;
    let entries = state
        .cache
        .get_scores(prefix, name, offset, offset + n - 1)
        .await
        .map_err(error_response)?;
    Ok(Json(
        entries
            .into_iter()
            .map(|s| ScoredItem { id: s.id, score: s.score })
            .collect(),
    ))
}

/// `GET /intermediate/recommend/{user-id}` and
/// `GET /intermediate/recommend/{user-id}/{category}`. Exposes the raw
/// `OfflineRecommend` cache entry the pipeline's first stage reads,
/// bypassing the fallback chain — useful for comparing a personalized
/// result against the offline model's own ranking.
#[utoipa::path(get, path = "/intermediate/recommend/{user_id}", tag = "Scored lists", params(
    ("user_id" = String, Path, description = "Opaque user identifier"),
), responses(
    (status = 200, description = "Raw offline-recommender scores for this user", body = Vec<ScoredItem>),
))]
pub async fn intermediate_recommend(
    State(state): State<AppState>,
    Path(params): Path<Vec<String>>,
    Query(query): Query<ScoredListQuery>,
) -> Result<Json<Vec<ScoredItem>>, (StatusCode, Json<ErrorResponse>)> {
    let (user_id, category) = split_user_and_category(&params);
    let n = query.n.unwrap_or(state.config.server.default_n) as i64;
    let offset = query.offset.unwrap_or(0) as i64;
    let entries = state
        .cache
        .get_category_scores(keys::OFFLINE_RECOMMEND, &user_id, &category, offset, offset + n - 1)
        .await
        .map_err(error_response)?;
    Ok(Json(
        entries
            .into_iter()
            .map(|s| ScoredItem { id: s.id, score: s.score })
            .collect(),
    ))
}

/// `GET /popular` — global popularity ranking.
#[utoipa::path(get, path = "/popular", tag = "Scored lists", responses(
    (status = 200, description = "Globally popular items", body = Vec<ScoredItem>),
))]
pub async fn popular_global(
    State(state): State<AppState>,
    Query(query): Query<ScoredListQuery>,
) -> Result<Json<Vec<ScoredItem>>, (StatusCode, Json<ErrorResponse>)> {
    scored_list(&state, keys::POPULAR_ITEMS, "", query).await
}

/// `GET /popular/{category}` — popularity ranking within a category.
#[utoipa::path(get, path = "/popular/{category}", tag = "Scored lists", params(
    ("category" = String, Path, description = "Category name"),
), responses(
    (status = 200, description = "Popular items within the category", body = Vec<ScoredItem>),
))]
pub async fn popular_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<ScoredListQuery>,
) -> Result<Json<Vec<ScoredItem>>, (StatusCode, Json<ErrorResponse>)> {
    scored_list(&state, keys::POPULAR_ITEMS, &category, query).await
}

/// `GET /latest` — globally latest items.
#[utoipa::path(get, path = "/latest", tag = "Scored lists", responses(
    (status = 200, description = "Latest items", body = Vec<ScoredItem>),
))]
pub async fn latest_global(
    State(state): State<AppState>,
    Query(query): Query<ScoredListQuery>,
) -> Result<Json<Vec<ScoredItem>>, (StatusCode, Json<ErrorResponse>)> {
    scored_list(&state, keys::LATEST_ITEMS, "", query).await
}

/// `GET /latest/{category}` — latest items within a category.
#[utoipa::path(get, path = "/latest/{category}", tag = "Scored lists", params(
    ("category" = String, Path, description = "Category name"),
), responses(
    (status = 200, description = "Latest items within the category", body = Vec<ScoredItem>),
))]
pub async fn latest_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<ScoredListQuery>,
) -> Result<Json<Vec<ScoredItem>>, (StatusCode, Json<ErrorResponse>)> {
    scored_list(&state, keys::LATEST_ITEMS, &category, query).await
}

/// `GET /item/{id}/neighbors` and `GET /item/{id}/neighbors/{category}`.
#[utoipa::path(get, path = "/item/{id}/neighbors", tag = "Scored lists", params(
    ("id" = String, Path, description = "Item identifier"),
), responses(
    (status = 200, description = "Items most similar to this item", body = Vec<ScoredItem>),
))]
pub async fn item_neighbors(
    State(state): State<AppState>,
    Path(params): Path<Vec<String>>,
    Query(query): Query<ScoredListQuery>,
) -> Result<Json<Vec<ScoredItem>>, (StatusCode, Json<ErrorResponse>)> {
    let (item_id, category) = split_user_and_category(&params);
    let name = if category.is_empty() {
        item_id
    } else {
        format!("{item_id}/{category}")
    };
    scored_list(&state, keys::ITEM_NEIGHBORS, &name, query).await
}

/// `GET /user/{id}/neighbors`.
#[utoipa::path(get, path = "/user/{id}/neighbors", tag = "Scored lists", params(
    ("id" = String, Path, description = "User identifier"),
), responses(
    (status = 200, description = "Users most similar to this user", body = Vec<ScoredItem>),
))]
pub async fn user_neighbors(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ScoredListQuery>,
) -> Result<Json<Vec<ScoredItem>>, (StatusCode, Json<ErrorResponse>)> {
    scored_list(&state, keys::USER_NEIGHBORS, &user_id, query).await
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}

#[utoipa::path(get, path = "/health", tag = "Operations", responses(
    (status = 200, description = "Service health", body = HealthResponse),
))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

#[utoipa::path(get, path = "/ready", tag = "Operations", responses(
    (status = 200, description = "Ready to serve traffic"),
))]
pub async fn readiness() -> StatusCode {
    StatusCode::OK
}

#[utoipa::path(get, path = "/live", tag = "Operations", responses(
    (status = 200, description = "Process is alive"),
))]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}
