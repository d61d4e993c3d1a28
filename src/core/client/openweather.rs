//! OpenWeather One Call client, mapping the daily forecast into the shape we
//! serve: local ISO timestamps and Beaufort wind numbers.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::config::Config;
use crate::domain::weather::model::{beaufort, FeelsLike, Temp, WeatherDay, WeatherDesc};
use crate::domain::weather::service::WeatherProvider;

const BASE_URL: &str = "https://api.openweathermap.org/data/3.0/onecall";

#[derive(Clone)]
pub struct OpenWeatherClient {
    http: reqwest::Client,
    key: Option<String>,
    lat: f64,
    lon: f64,
    tz: Tz,
}

impl OpenWeatherClient {
    pub fn new(http: reqwest::Client, cfg: &Config) -> Self {
        Self {
            http,
            key: cfg.openweather_key.clone(),
            lat: cfg.lat,
            lon: cfg.lon,
            tz: cfg.tz,
        }
    }
}

impl WeatherProvider for OpenWeatherClient {
    async fn fetch_daily(&self) -> Result<HashMap<NaiveDate, WeatherDay>> {
        let Some(key) = self.key.as_deref() else {
            bail!("OPENWEATHER_KEY is not set, skipping weather fetch");
        };

        let response = self
            .http
            .get(BASE_URL)
            .query(&[("lat", self.lat), ("lon", self.lon)])
            .query(&[
                ("exclude", "minutely,hourly,alerts,current"),
                ("units", "metric"),
                ("appid", key),
            ])
            .send()
            .await
            .context("openweather request failed")?
            .error_for_status()
            .context("openweather returned an error status")?;

        let body: OneCallResponse = response
            .json()
            .await
            .context("malformed openweather response")?;

        Ok(body
            .daily
            .into_iter()
            .map(|raw| raw.into_weather_day(self.tz))
            .collect())
    }
}

#[derive(Deserialize)]
struct OneCallResponse {
    #[serde(default)]
    daily: Vec<RawDaily>,
}

#[derive(Deserialize)]
struct RawDaily {
    dt: i64,
    sunrise: Option<i64>,
    sunset: Option<i64>,
    moonrise: Option<i64>,
    moonset: Option<i64>,
    moon_phase: Option<f64>,
    summary: Option<String>,
    temp: Temp,
    feels_like: FeelsLike,
    pressure: u32,
    humidity: u32,
    dew_point: f64,
    wind_speed: f64,
    wind_gust: Option<f64>,
    wind_deg: u32,
    #[serde(default)]
    weather: Vec<WeatherDesc>,
    clouds: u32,
    pop: f64,
    uvi: f64,
}

fn iso_local(ts: i64, tz: Tz) -> Option<String> {
    Utc.timestamp_opt(ts, 0)
        .single()
        .map(|dt| dt.with_timezone(&tz).to_rfc3339())
}

impl RawDaily {
    fn into_weather_day(self, tz: Tz) -> (NaiveDate, WeatherDay) {
        let local = Utc
            .timestamp_opt(self.dt, 0)
            .single()
            .unwrap_or_default()
            .with_timezone(&tz);

        let day = WeatherDay {
            dt: local.to_rfc3339(),
            sunrise: self.sunrise.and_then(|ts| iso_local(ts, tz)),
            sunset: self.sunset.and_then(|ts| iso_local(ts, tz)),
            moonrise: self.moonrise.and_then(|ts| iso_local(ts, tz)),
            moonset: self.moonset.and_then(|ts| iso_local(ts, tz)),
            moon_phase: self.moon_phase,
            summary: self.summary,
            temp: self.temp,
            feels_like: self.feels_like,
            pressure: self.pressure,
            humidity: self.humidity,
            dew_point: self.dew_point,
            wind_speed: self.wind_speed,
            wind_speed_beaufort: beaufort(self.wind_speed),
            wind_gust: self.wind_gust,
            wind_gust_beaufort: self.wind_gust.map(beaufort),
            wind_deg: self.wind_deg,
            weather: self.weather,
            clouds: self.clouds,
            pop: self.pop,
            uvi: self.uvi,
        };
        (local.date_naive(), day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::London;
    use serde_json::json;

    #[test]
    fn maps_daily_forecast_to_local_day() {
        let raw: RawDaily = serde_json::from_value(json!({
            // 2025-06-01 11:00 UTC -> 12:00 BST
            "dt": 1748775600,
            "sunrise": 1748750000,
            "sunset": 1748810000,
            "moon_phase": 0.25,
            "temp": {"day": 17.0, "min": 11.0, "max": 18.5, "night": 12.0, "eve": 16.0, "morn": 12.5},
            "feels_like": {"day": 16.5, "night": 11.5, "eve": 15.5, "morn": 12.0},
            "pressure": 1016,
            "humidity": 64,
            "dew_point": 10.1,
            "wind_speed": 6.2,
            "wind_gust": 11.3,
            "wind_deg": 250,
            "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
            "clouds": 52,
            "pop": 0.35,
            "uvi": 6.1
        }))
        .unwrap();

        let (day, mapped) = raw.into_weather_day(London);
        assert_eq!(day, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(mapped.dt, "2025-06-01T12:00:00+01:00");
        assert_eq!(mapped.wind_speed_beaufort, 4);
        assert_eq!(mapped.wind_gust_beaufort, Some(6));
        assert!(mapped.sunrise.unwrap().ends_with("+01:00"));
        assert_eq!(mapped.weather[0].main, "Rain");
    }
}
