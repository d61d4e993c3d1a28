//! Daily-forecast cache keyed by local date.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, Utc};

use crate::config::Config;
use crate::core::cache::cell::{CacheCell, RefreshOutcome};
use crate::domain::weather::model::WeatherDay;

/// Upstream forecast source, keyed by local calendar date.
pub trait WeatherProvider: Clone + Send + Sync + 'static {
    fn fetch_daily(&self) -> impl Future<Output = Result<HashMap<NaiveDate, WeatherDay>>> + Send;
}

pub struct WeatherService<P> {
    cfg: Arc<Config>,
    provider: P,
    cell: CacheCell<HashMap<NaiveDate, WeatherDay>>,
}

impl<P: WeatherProvider> WeatherService<P> {
    pub fn new(cfg: Arc<Config>, provider: P) -> Self {
        Self {
            cell: CacheCell::new("weather", cfg.weather_max_age),
            cfg,
            provider,
        }
    }

    pub async fn refresh(&self) -> RefreshOutcome {
        let provider = self.provider.clone();
        self.cell
            .refresh(self.cfg.refresh_join_wait, async move {
                provider.fetch_daily().await
            })
            .await
    }

    /// Forecast for one local day. A cache miss triggers a refresh through
    /// the single-flight guard before giving up; `None` means the upstream
    /// genuinely has nothing for that day.
    pub async fn forecast_for_day(&self, day: NaiveDate) -> Option<WeatherDay> {
        let cached = self.cell.get().and_then(|m| m.get(&day).cloned());
        if cached.is_some() && !self.cell.is_stale(Utc::now()) {
            return cached;
        }
        self.refresh().await;
        self.cell.get().and_then(|m| m.get(&day).cloned())
    }
}
