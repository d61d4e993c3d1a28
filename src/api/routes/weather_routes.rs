//! Weather routes (e.g., /api/v1/weather/*)

use axum::{routing::get, Router};

use crate::api::controller::weather::WeatherController;
use crate::app_state::AppState;

pub fn weather_routes() -> Router<AppState> {
    Router::new().route("/{date}", get(WeatherController::for_date))
}
