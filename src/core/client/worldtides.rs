//! WorldTides API client (https://www.worldtides.info/api/v3).

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;

use crate::config::Config;
use crate::domain::tide::model::{ExtremeKind, Sample, SampleSeries, TideExtreme};
use crate::domain::tide::service::TideProvider;

const BASE_URL: &str = "https://www.worldtides.info/api/v3";
/// The extremes endpoint caps requests at a week per call.
const EXTREMES_CHUNK_DAYS: u32 = 7;

#[derive(Clone)]
pub struct WorldTidesClient {
    http: reqwest::Client,
    key: Option<String>,
    lat: f64,
    lon: f64,
}

impl WorldTidesClient {
    pub fn new(http: reqwest::Client, cfg: &Config) -> Self {
        Self {
            http,
            key: cfg.worldtides_key.clone(),
            lat: cfg.lat,
            lon: cfg.lon,
        }
    }

    fn key(&self) -> Result<&str> {
        match self.key.as_deref() {
            Some(key) => Ok(key),
            None => bail!("WORLDTIDES_KEY is not set, skipping tide fetch"),
        }
    }

    async fn get_extremes_chunk(&self, start: NaiveDate, days: u32) -> Result<Vec<RawExtreme>> {
        let key = self.key()?;
        let response = self
            .http
            .get(BASE_URL)
            .query(&[("extremes", "")])
            .query(&[("lat", self.lat), ("lon", self.lon)])
            .query(&[("date", start.format("%Y-%m-%d").to_string())])
            .query(&[("days", days)])
            .query(&[("key", key)])
            .send()
            .await
            .context("worldtides extremes request failed")?
            .error_for_status()
            .context("worldtides extremes returned an error status")?;

        let body: ExtremesResponse = response
            .json()
            .await
            .context("malformed worldtides extremes response")?;
        Ok(body.extremes)
    }
}

impl TideProvider for WorldTidesClient {
    /// Fetch high/low water events for the window, in week-sized chunks.
    async fn fetch_extremes(&self, start: NaiveDate, days: u32) -> Result<Vec<TideExtreme>> {
        let mut extremes = Vec::new();
        let mut current = start;
        let mut remaining = days;
        while remaining > 0 {
            let chunk_days = remaining.min(EXTREMES_CHUNK_DAYS);
            let chunk = self.get_extremes_chunk(current, chunk_days).await?;
            extremes.extend(chunk.into_iter().filter_map(RawExtreme::into_extreme));
            current = current + chrono::Duration::days(chunk_days as i64);
            remaining -= chunk_days;
        }
        Ok(extremes)
    }

    async fn fetch_heights(&self, start: NaiveDate, days: u32) -> Result<SampleSeries> {
        let key = self.key()?;
        let response = self
            .http
            .get(BASE_URL)
            .query(&[("heights", "")])
            .query(&[("lat", self.lat), ("lon", self.lon)])
            .query(&[("date", start.format("%Y-%m-%d").to_string())])
            .query(&[("days", days)])
            .query(&[("datum", "CD")])
            .query(&[("key", key)])
            .send()
            .await
            .context("worldtides heights request failed")?
            .error_for_status()
            .context("worldtides heights returned an error status")?;

        let body: HeightsResponse = response
            .json()
            .await
            .context("malformed worldtides heights response")?;

        Ok(SampleSeries::new(
            body.heights
                .into_iter()
                .filter_map(|h| {
                    Some(Sample {
                        at: Utc.timestamp_opt(h.dt, 0).single()?,
                        height: h.height,
                    })
                })
                .collect(),
        ))
    }
}

#[derive(Deserialize)]
struct HeightsResponse {
    #[serde(default)]
    heights: Vec<RawHeight>,
}

#[derive(Deserialize)]
struct RawHeight {
    dt: i64,
    height: f64,
}

#[derive(Deserialize)]
struct ExtremesResponse {
    #[serde(default)]
    extremes: Vec<RawExtreme>,
}

#[derive(Deserialize)]
struct RawExtreme {
    dt: i64,
    height: f64,
    #[serde(rename = "type")]
    kind: String,
}

impl RawExtreme {
    fn into_extreme(self) -> Option<TideExtreme> {
        let kind = match self.kind.as_str() {
            "High" => ExtremeKind::High,
            "Low" => ExtremeKind::Low,
            _ => return None,
        };
        Some(TideExtreme {
            at: Utc.timestamp_opt(self.dt, 0).single()?,
            height: self.height,
            kind,
        })
    }
}
