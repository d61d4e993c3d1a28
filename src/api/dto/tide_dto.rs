//! Tide API DTOs, mirroring the shapes served at the boundary: local ISO
//! timestamps plus a separate local date string.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::domain::tide::model::{GateEvent, Sample, TideExtreme};

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct HeightsQuery {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    /// Local calendar dates (YYYY-MM-DD), inclusive.
    pub from: Option<chrono::NaiveDate>,
    pub to: Option<chrono::NaiveDate>,
}

#[derive(Serialize)]
pub struct TideExtremeDto {
    pub dt: String,
    pub date: String,
    pub height: f64,
    pub r#type: &'static str,
}

impl TideExtremeDto {
    pub fn from_domain(extreme: &TideExtreme, tz: Tz) -> Self {
        let local = extreme.at.with_timezone(&tz);
        Self {
            dt: local.to_rfc3339(),
            date: local.format("%Y-%m-%d").to_string(),
            height: extreme.height,
            r#type: match extreme.kind {
                crate::domain::tide::model::ExtremeKind::High => "High",
                crate::domain::tide::model::ExtremeKind::Low => "Low",
            },
        }
    }
}

#[derive(Serialize)]
pub struct TideHeightDto {
    pub dt: String,
    pub date: String,
    pub height: f64,
}

impl TideHeightDto {
    pub fn from_domain(sample: &Sample, tz: Tz) -> Self {
        let local = sample.at.with_timezone(&tz);
        Self {
            dt: local.to_rfc3339(),
            date: local.format("%Y-%m-%d").to_string(),
            height: sample.height,
        }
    }
}

/// A gate operation, labelled with the physical action ("lower" when the
/// tide rises over the threshold, "raise" when it falls back under).
#[derive(Serialize)]
pub struct GateEventDto {
    pub datetime: String,
    pub action: &'static str,
    pub height: f64,
}

impl GateEventDto {
    pub fn from_domain(event: &GateEvent, tz: Tz) -> Self {
        Self {
            datetime: event.at.with_timezone(&tz).to_rfc3339(),
            action: event.kind.gate_action(),
            height: event.threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tide::model::Crossing;
    use chrono::{DateTime, Utc};
    use chrono_tz::Europe::London;

    #[test]
    fn gate_event_dto_carries_action_label_and_local_time() {
        let event = GateEvent {
            at: "2025-06-01T09:20:00Z".parse::<DateTime<Utc>>().unwrap(),
            kind: Crossing::Up,
            threshold: 4.0,
        };
        let dto = GateEventDto::from_domain(&event, London);
        assert_eq!(dto.action, "lower");
        assert_eq!(dto.datetime, "2025-06-01T10:20:00+01:00");
        assert_eq!(dto.height, 4.0);
    }

    #[test]
    fn height_dto_date_follows_local_zone() {
        let sample = Sample {
            at: "2025-06-01T23:30:00Z".parse::<DateTime<Utc>>().unwrap(),
            height: 2.5,
        };
        let dto = TideHeightDto::from_domain(&sample, London);
        // 23:30 UTC is 00:30 BST the next day.
        assert_eq!(dto.date, "2025-06-02");
    }
}
