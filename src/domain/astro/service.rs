//! Memoised astronomy lookups: sunrise/sunset, moon phase, marine forecast.
//!
//! These are pass-through payloads memoised per structured key; unlike the
//! tide and weather cells they never go stale within a process lifetime.

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use serde_json::Value;

use crate::core::cache::memo::MemoCache;
use crate::core::client::astro::AstroClient;

/// Coordinates quantised to 1e-4 degrees (~10 m), so float query parameters
/// make a usable map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocationKey {
    lat_e4: i32,
    lon_e4: i32,
}

impl LocationKey {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat_e4: (lat * 1e4).round() as i32,
            lon_e4: (lon * 1e4).round() as i32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SunKey {
    pub location: LocationKey,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarineKey {
    pub location: LocationKey,
    pub hourly: String,
    pub timeformat: String,
    pub forecast_hours: u32,
}

pub struct AstroService {
    client: AstroClient,
    sun: MemoCache<SunKey, Value>,
    moon: MemoCache<i64, Value>,
    marine: MemoCache<MarineKey, Value>,
}

impl AstroService {
    pub fn new(client: AstroClient) -> Self {
        Self {
            client,
            sun: MemoCache::default(),
            moon: MemoCache::default(),
            marine: MemoCache::default(),
        }
    }

    pub async fn sunrise_sunset(&self, date: NaiveDate, lat: f64, lng: f64) -> Result<Arc<Value>> {
        let key = SunKey {
            location: LocationKey::new(lat, lng),
            date,
        };
        if let Some(cached) = self.sun.get(&key) {
            return Ok(cached);
        }
        let data = self.client.fetch_sunrise_sunset(date, lat, lng).await?;
        Ok(self.sun.insert(key, data))
    }

    pub async fn moon_phase(&self, date: NaiveDate) -> Result<Arc<Value>> {
        let ts = date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        if let Some(cached) = self.moon.get(&ts) {
            return Ok(cached);
        }
        let data = self.client.fetch_moon_phase(ts).await?;
        Ok(self.moon.insert(ts, data))
    }

    pub async fn marine(
        &self,
        lat: f64,
        lon: f64,
        hourly: String,
        timeformat: String,
        forecast_hours: u32,
    ) -> Result<Arc<Value>> {
        let key = MarineKey {
            location: LocationKey::new(lat, lon),
            hourly: hourly.clone(),
            timeformat: timeformat.clone(),
            forecast_hours,
        };
        if let Some(cached) = self.marine.get(&key) {
            return Ok(cached);
        }
        let data = self
            .client
            .fetch_marine(lat, lon, &hourly, &timeformat, forecast_hours)
            .await?;
        Ok(self.marine.insert(key, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_key_quantises_consistently() {
        let a = LocationKey::new(53.28, -3.83);
        let b = LocationKey::new(53.280000001, -3.8299999);
        assert_eq!(a, b);

        let c = LocationKey::new(53.29, -3.83);
        assert_ne!(a, c);
    }
}
