//! Astronomy API query DTOs.

use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct SunQuery {
    pub date: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Deserialize, Debug)]
pub struct MoonQuery {
    pub date: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct MarineQuery {
    pub forecast_hours: Option<u32>,
    pub timeformat: Option<String>,
    pub hourly: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}
