use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::core::client::astro::AstroClient;
use crate::core::client::openweather::OpenWeatherClient;
use crate::core::client::worldtides::WorldTidesClient;
use crate::domain::astro::service::AstroService;
use crate::domain::tide::service::TideService;
use crate::domain::weather::service::WeatherService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tide: Arc<TideService<WorldTidesClient>>,
    pub weather: Arc<WeatherService<OpenWeatherClient>>,
    pub astro: Arc<AstroService>,
}

pub fn build_app_state(config: Config) -> Result<AppState> {
    let config = Arc::new(config);
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("failed to build HTTP client")?;

    Ok(AppState {
        tide: Arc::new(TideService::new(
            Arc::clone(&config),
            WorldTidesClient::new(http.clone(), &config),
        )),
        weather: Arc::new(WeatherService::new(
            Arc::clone(&config),
            OpenWeatherClient::new(http.clone(), &config),
        )),
        astro: Arc::new(AstroService::new(AstroClient::new(http, &config))),
        config,
    })
}
