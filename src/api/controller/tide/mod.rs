use axum::extract::{Path, Query, State};
use axum::Json;

use crate::api::dto::tide_dto::{HeightsQuery, TideExtremeDto, TideHeightDto};
use crate::api::dto::{ApiResponse, PaginatedResponse};
use crate::api::util::date::parse_date;
use crate::app_state::AppState;
use crate::errors::AppError;

const DEFAULT_PAGE_SIZE: usize = 100;

pub struct TideController;

impl TideController {
    /// High/low water events for one local calendar day.
    pub async fn extremes_for_date(
        State(state): State<AppState>,
        Path(date): Path<String>,
    ) -> Result<Json<ApiResponse<Vec<TideExtremeDto>>>, AppError> {
        let date = parse_date(&date)?;
        let extremes = state.tide.extremes_for_day(date).await;
        if extremes.is_empty() {
            return Err(AppError::NotFound(format!("no tide data for {date}")));
        }

        let tz = state.config.tz;
        let items = extremes
            .iter()
            .map(|e| TideExtremeDto::from_domain(e, tz))
            .collect();
        Ok(Json(ApiResponse::ok(items)))
    }

    /// Raw half-hourly height samples, paginated, optionally restricted to a
    /// local-date range.
    pub async fn heights(
        State(state): State<AppState>,
        Query(q): Query<HeightsQuery>,
    ) -> Result<Json<ApiResponse<PaginatedResponse<TideHeightDto>>>, AppError> {
        let offset = q.offset.unwrap_or(0);
        let limit = q.limit.unwrap_or(DEFAULT_PAGE_SIZE);

        let (page, total) = state.tide.heights_page(q.from, q.to, offset, limit).await;
        let tz = state.config.tz;
        let items = page
            .iter()
            .map(|s| TideHeightDto::from_domain(s, tz))
            .collect();
        Ok(Json(ApiResponse::ok(PaginatedResponse::new(
            items, total, limit, offset,
        ))))
    }
}
