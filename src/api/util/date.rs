use chrono::NaiveDate;

use crate::errors::AppError;

/// Parse a YYYY-MM-DD path/query segment, mapping failure to a 400.
pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("invalid date {raw:?}, expected YYYY-MM-DD")))
}
