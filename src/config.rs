//! Runtime configuration, read once from the environment at startup.

use std::str::FromStr;
use std::time::Duration as StdDuration;

use anyhow::{Context, Result};
use chrono::Duration;
use chrono_tz::Tz;

/// Conwy harbour by default.
const DEFAULT_LAT: f64 = 53.28;
const DEFAULT_LON: f64 = -3.83;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub worldtides_key: Option<String>,
    pub openweather_key: Option<String>,
    /// Tide height (in metres, datum CD) at which the gate is operated.
    pub gate_open_height: f64,
    pub lat: f64,
    pub lon: f64,
    pub tz: Tz,
    /// Cadence of the background refresh driver.
    pub refresh_interval: StdDuration,
    /// How long a reader waits on an in-flight refresh before returning
    /// whatever is already cached.
    pub refresh_join_wait: StdDuration,
    pub extremes_window_days: u32,
    pub heights_window_days: u32,
    pub extremes_max_age: Duration,
    pub heights_max_age: Duration,
    pub weather_max_age: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let tz_name = env_or("TIDE_TZ", "Europe/London");
        let tz: Tz = tz_name
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid TIDE_TZ {tz_name:?}: {e}"))?;

        Ok(Self {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:8000"),
            worldtides_key: non_empty(std::env::var("WORLDTIDES_KEY").ok()),
            openweather_key: non_empty(std::env::var("OPENWEATHER_KEY").ok()),
            gate_open_height: env_parse("GATE_OPEN_HEIGHT", 4.0)?,
            lat: env_parse("TIDE_LAT", DEFAULT_LAT)?,
            lon: env_parse("TIDE_LON", DEFAULT_LON)?,
            tz,
            refresh_interval: StdDuration::from_secs(
                env_parse("REFRESH_INTERVAL_SECS", 60 * 60 * 12)?,
            ),
            refresh_join_wait: StdDuration::from_secs(env_parse("REFRESH_JOIN_WAIT_SECS", 10)?),
            extremes_window_days: env_parse("TIDE_EXTREMES_WINDOW_DAYS", 365)?,
            heights_window_days: env_parse("TIDE_HEIGHTS_WINDOW_DAYS", 180)?,
            extremes_max_age: Duration::hours(12),
            heights_max_age: Duration::days(7),
            weather_max_age: Duration::hours(12),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        Err(_) => Ok(default),
    }
}
