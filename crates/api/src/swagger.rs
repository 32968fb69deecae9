//! OpenAPI specification and Swagger UI configuration.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Recommend Express API",
        version = "0.1.0",
        description = "Online recommendation pipeline: offline, collaborative, item-based, user-based, latest, and popular recommenders behind one fallback chain.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Recommend", description = "Personalized recommendation endpoint"),
        (name = "Scored lists", description = "Raw scored-list lookups: popular, latest, and neighbor lists"),
        (name = "Operations", description = "Health, readiness, and liveness probes"),
    ),
    paths(
        crate::rest::recommend,
        crate::rest::intermediate_recommend,
        crate::rest::popular_global,
        crate::rest::popular_category,
        crate::rest::latest_global,
        crate::rest::latest_category,
        crate::rest::item_neighbors,
        crate::rest::user_neighbors,
        crate::rest::health_check,
        crate::rest::readiness,
        crate::rest::liveness,
    ),
    components(schemas(
        crate::rest::ErrorResponse,
        crate::rest::ScoredItem,
        crate::rest::HealthResponse,
    ))
)]
pub struct ApiDoc;
