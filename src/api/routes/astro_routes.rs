//! Astronomy routes (e.g., /api/v1/astro/*)

use axum::{routing::get, Router};

use crate::api::controller::astro::AstroController;
use crate::app_state::AppState;

pub fn astro_routes() -> Router<AppState> {
    Router::new()
        .route("/sunrise-sunset", get(AstroController::sunrise_sunset))
        .route("/moon-phase", get(AstroController::moon_phase))
        .route("/marine", get(AstroController::marine))
}
