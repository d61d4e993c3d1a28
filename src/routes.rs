use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use tower_http::cors::CorsLayer;

use crate::api::dto::ApiResponse;
use crate::app_state::AppState;

/// Build the main application router
pub fn app_router() -> Router<AppState> {
    // Tide, weather and astro subrouters live under /api/v1
    let api_v1 = Router::new()
        .merge(crate::api::routes::tide_routes::tide_routes())
        .nest("/weather", crate::api::routes::weather_routes::weather_routes())
        .nest("/astro", crate::api::routes::astro_routes::astro_routes());

    Router::new()
        // Root route
        .route("/", get(root))
        // Health check
        .route("/health", get(health_check))
        // API v1
        .nest("/api/v1", api_v1)
        // Fallback handler for 404
        .fallback(handler_404)
        // CORS applies to all routes
        .layer(CorsLayer::very_permissive())
}

// Handler for root
async fn root() -> &'static str {
    "Server is running!"
}

// Handler for health check
async fn health_check() -> &'static str {
    "OK"
}

// Handler for 404 Not Found
async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::err(
            "The requested resource was not found",
        )),
    )
}
