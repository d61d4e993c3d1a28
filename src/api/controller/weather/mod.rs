use axum::extract::{Path, State};
use axum::Json;
use chrono::{Duration, Utc};

use crate::api::dto::ApiResponse;
use crate::api::util::date::parse_date;
use crate::app_state::AppState;
use crate::domain::weather::model::WeatherDay;
use crate::errors::AppError;

/// The upstream daily forecast covers about a week; we only serve the part
/// short enough to be trustworthy.
const FORECAST_HORIZON_DAYS: i64 = 5;

pub struct WeatherController;

impl WeatherController {
    pub async fn for_date(
        State(state): State<AppState>,
        Path(date): Path<String>,
    ) -> Result<Json<ApiResponse<WeatherDay>>, AppError> {
        let target = parse_date(&date)?;

        let today = Utc::now().with_timezone(&state.config.tz).date_naive();
        if target < today || target > today + Duration::days(FORECAST_HORIZON_DAYS) {
            return Err(AppError::NotFound(format!(
                "weather available only for the next {FORECAST_HORIZON_DAYS} days"
            )));
        }

        let day = state
            .weather
            .forecast_for_day(target)
            .await
            .ok_or_else(|| AppError::NotFound(format!("no weather data for {target}")))?;
        Ok(Json(ApiResponse::ok(day)))
    }
}
