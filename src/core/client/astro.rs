//! Pass-through clients for the astronomy collaborators: sunrise-sunset.org,
//! FarmSense moon phases and Open-Meteo marine.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde_json::Value;

use crate::config::Config;

const SUNRISE_SUNSET_URL: &str = "https://api.sunrise-sunset.org/json";
const MOON_PHASE_URL: &str = "https://api.farmsense.net/v1/moonphases/";
const MARINE_URL: &str = "https://api.open-meteo.com/v1/marine";

#[derive(Clone)]
pub struct AstroClient {
    http: reqwest::Client,
    tz: Tz,
}

impl AstroClient {
    pub fn new(http: reqwest::Client, cfg: &Config) -> Self {
        Self { http, tz: cfg.tz }
    }

    pub async fn fetch_sunrise_sunset(
        &self,
        date: NaiveDate,
        lat: f64,
        lng: f64,
    ) -> Result<Value> {
        let mut data: Value = self
            .http
            .get(SUNRISE_SUNSET_URL)
            .query(&[("lat", lat), ("lng", lng)])
            .query(&[("date", date.format("%Y-%m-%d").to_string())])
            .query(&[("formatted", 0)])
            .send()
            .await
            .context("sunrise-sunset request failed")?
            .error_for_status()
            .context("sunrise-sunset returned an error status")?
            .json()
            .await
            .context("malformed sunrise-sunset response")?;

        if let Value::Object(map) = &mut data {
            map.insert("tzid".into(), Value::String(self.tz.name().to_string()));
        }
        Ok(data)
    }

    /// FarmSense returns a one-element list; unwrap it for callers.
    pub async fn fetch_moon_phase(&self, ts: i64) -> Result<Value> {
        let data: Value = self
            .http
            .get(MOON_PHASE_URL)
            .query(&[("d", ts)])
            .send()
            .await
            .context("moon phase request failed")?
            .error_for_status()
            .context("moon phase returned an error status")?
            .json()
            .await
            .context("malformed moon phase response")?;

        Ok(match data {
            Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
            other => other,
        })
    }

    pub async fn fetch_marine(
        &self,
        lat: f64,
        lon: f64,
        hourly: &str,
        timeformat: &str,
        forecast_hours: u32,
    ) -> Result<Value> {
        self.http
            .get(MARINE_URL)
            .query(&[("latitude", lat), ("longitude", lon)])
            .query(&[("hourly", hourly), ("timeformat", timeformat)])
            .query(&[("forecast_hours", forecast_hours)])
            .send()
            .await
            .context("marine forecast request failed")?
            .error_for_status()
            .context("marine forecast returned an error status")?
            .json()
            .await
            .context("malformed marine forecast response")
    }
}
