use axum::extract::{Query, State};
use axum::Json;
use serde_json::Value;

use crate::api::dto::astro_dto::{MarineQuery, MoonQuery, SunQuery};
use crate::api::dto::ApiResponse;
use crate::api::util::date::parse_date;
use crate::app_state::AppState;
use crate::errors::AppError;

const DEFAULT_MARINE_HOURLY: &str =
    "sea_level_height_msl,ocean_current_velocity,ocean_current_direction";

pub struct AstroController;

impl AstroController {
    pub async fn sunrise_sunset(
        State(state): State<AppState>,
        Query(q): Query<SunQuery>,
    ) -> Result<Json<ApiResponse<Value>>, AppError> {
        let date = parse_date(&q.date)?;
        let lat = q.lat.unwrap_or(state.config.lat);
        let lng = q.lng.unwrap_or(state.config.lon);

        let data = state
            .astro
            .sunrise_sunset(date, lat, lng)
            .await
            .map_err(|e| AppError::UpstreamError(e.to_string()))?;
        Ok(Json(ApiResponse::ok((*data).clone())))
    }

    pub async fn moon_phase(
        State(state): State<AppState>,
        Query(q): Query<MoonQuery>,
    ) -> Result<Json<ApiResponse<Value>>, AppError> {
        let date = parse_date(&q.date)?;
        let data = state
            .astro
            .moon_phase(date)
            .await
            .map_err(|e| AppError::UpstreamError(e.to_string()))?;
        Ok(Json(ApiResponse::ok((*data).clone())))
    }

    pub async fn marine(
        State(state): State<AppState>,
        Query(q): Query<MarineQuery>,
    ) -> Result<Json<ApiResponse<Value>>, AppError> {
        let data = state
            .astro
            .marine(
                q.lat.unwrap_or(state.config.lat),
                q.lon.unwrap_or(state.config.lon),
                q.hourly.unwrap_or_else(|| DEFAULT_MARINE_HOURLY.to_string()),
                q.timeformat.unwrap_or_else(|| "unixtime".to_string()),
                q.forecast_hours.unwrap_or(48),
            )
            .await
            .map_err(|e| AppError::UpstreamError(e.to_string()))?;
        Ok(Json(ApiResponse::ok((*data).clone())))
    }
}
