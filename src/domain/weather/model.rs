//! Daily forecast shapes served to clients, plus wind-scale helpers.

use serde::{Deserialize, Serialize};

/// Convert a wind speed in metres/second to the Beaufort scale.
pub fn beaufort(speed: f64) -> u8 {
    const THRESHOLDS: [f64; 12] = [
        0.5, 1.5, 3.3, 5.5, 7.9, 10.7, 13.8, 17.1, 20.7, 24.4, 28.4, 32.6,
    ];
    THRESHOLDS
        .iter()
        .position(|t| speed < *t)
        .map_or(12, |i| i as u8)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Temp {
    pub day: f64,
    pub min: f64,
    pub max: f64,
    pub night: f64,
    pub eve: f64,
    pub morn: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeelsLike {
    pub day: f64,
    pub night: f64,
    pub eve: f64,
    pub morn: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherDesc {
    pub id: u32,
    pub main: String,
    pub description: String,
    pub icon: String,
}

/// One day of forecast, timestamps already rendered in the local zone and
/// Beaufort numbers derived from the raw wind speeds.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherDay {
    pub dt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moonrise: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moonset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moon_phase: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub temp: Temp,
    pub feels_like: FeelsLike,
    pub pressure: u32,
    pub humidity: u32,
    pub dew_point: f64,
    pub wind_speed: f64,
    pub wind_speed_beaufort: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_gust: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_gust_beaufort: Option<u8>,
    pub wind_deg: u32,
    pub weather: Vec<WeatherDesc>,
    pub clouds: u32,
    pub pop: f64,
    pub uvi: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beaufort_scale_boundaries() {
        assert_eq!(beaufort(0.0), 0);
        assert_eq!(beaufort(0.4), 0);
        assert_eq!(beaufort(0.5), 1);
        assert_eq!(beaufort(3.2), 2);
        assert_eq!(beaufort(3.3), 3);
        assert_eq!(beaufort(10.7), 6);
        assert_eq!(beaufort(24.4), 10);
        assert_eq!(beaufort(32.5), 11);
        assert_eq!(beaufort(32.6), 12);
        assert_eq!(beaufort(50.0), 12);
    }
}
