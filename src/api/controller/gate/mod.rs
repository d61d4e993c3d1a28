use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::Json;

use crate::api::dto::tide_dto::GateEventDto;
use crate::api::dto::ApiResponse;
use crate::api::util::date::parse_date;
use crate::app_state::AppState;
use crate::errors::AppError;

pub struct GateController;

impl GateController {
    /// All derived gate operations, keyed by local date in dayKey order.
    pub async fn all(
        State(state): State<AppState>,
    ) -> Result<Json<ApiResponse<BTreeMap<String, Vec<GateEventDto>>>>, AppError> {
        let tz = state.config.tz;
        let events = state.tide.all_gate_events().await;
        let body = events
            .iter()
            .map(|(day, list)| {
                (
                    day.format("%Y-%m-%d").to_string(),
                    list.iter().map(|e| GateEventDto::from_domain(e, tz)).collect(),
                )
            })
            .collect();
        Ok(Json(ApiResponse::ok(body)))
    }

    /// Gate operations for one local day; 404 when the day has none.
    pub async fn for_date(
        State(state): State<AppState>,
        Path(date): Path<String>,
    ) -> Result<Json<ApiResponse<Vec<GateEventDto>>>, AppError> {
        let date = parse_date(&date)?;
        let events = state
            .tide
            .gate_events_for_day(date)
            .await
            .ok_or_else(|| AppError::NotFound(format!("no gate times for {date}")))?;

        let tz = state.config.tz;
        let items = events
            .iter()
            .map(|e| GateEventDto::from_domain(e, tz))
            .collect();
        Ok(Json(ApiResponse::ok(items)))
    }
}
