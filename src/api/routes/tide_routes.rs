//! Tide routes (e.g., /api/v1/tides/*, /api/v1/gate-times/*)

use axum::{routing::get, Router};

use crate::api::controller::gate::GateController;
use crate::api::controller::tide::TideController;
use crate::app_state::AppState;

pub fn tide_routes() -> Router<AppState> {
    Router::new()
        .route("/tides/{date}", get(TideController::extremes_for_date))
        .route("/tide-heights", get(TideController::heights))
        .route("/gate-times", get(GateController::all))
        .route("/gate-times/{date}", get(GateController::for_date))
}
