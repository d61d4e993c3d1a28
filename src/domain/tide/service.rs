//! Tide cache orchestration: owns the heights and extremes cells, re-derives
//! gate events whenever the heights change, and exposes the read side
//! consumed by the controllers.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::config::Config;
use crate::core::cache::cell::{CacheCell, DerivedCell, RefreshOutcome};
use crate::domain::tide::gate::derive_crossings;
use crate::domain::tide::model::{GateEvent, GateEventsByDay, Sample, SampleSeries, TideExtreme};

/// Upstream source of tide data. Implemented by the WorldTides client and by
/// fakes in tests.
pub trait TideProvider: Clone + Send + Sync + 'static {
    fn fetch_extremes(
        &self,
        start: NaiveDate,
        days: u32,
    ) -> impl Future<Output = Result<Vec<TideExtreme>>> + Send;

    fn fetch_heights(
        &self,
        start: NaiveDate,
        days: u32,
    ) -> impl Future<Output = Result<SampleSeries>> + Send;
}

pub struct TideService<P> {
    cfg: Arc<Config>,
    provider: P,
    extremes: CacheCell<Vec<TideExtreme>>,
    heights: CacheCell<SampleSeries>,
    gate_events: DerivedCell<GateEventsByDay>,
}

impl<P: TideProvider> TideService<P> {
    pub fn new(cfg: Arc<Config>, provider: P) -> Self {
        Self {
            extremes: CacheCell::new("tide_extremes", cfg.extremes_max_age),
            heights: CacheCell::new("tide_heights", cfg.heights_max_age),
            gate_events: DerivedCell::new(),
            cfg,
            provider,
        }
    }

    pub async fn refresh_extremes(&self) -> RefreshOutcome {
        let provider = self.provider.clone();
        let start = Utc::now().date_naive();
        let days = self.cfg.extremes_window_days;
        self.extremes
            .refresh(self.cfg.refresh_join_wait, async move {
                provider.fetch_extremes(start, days).await
            })
            .await
    }

    /// Refresh the height series and, on success, rebuild the gate events
    /// from the new samples before the refresh is considered complete.
    pub async fn refresh_heights(&self) -> RefreshOutcome {
        let provider = self.provider.clone();
        let start = Utc::now().date_naive();
        let days = self.cfg.heights_window_days;
        let derived = self.gate_events.clone();
        let threshold = self.cfg.gate_open_height;
        let tz = self.cfg.tz;
        self.heights
            .refresh_then(
                self.cfg.refresh_join_wait,
                async move { provider.fetch_heights(start, days).await },
                move |series| {
                    let events = derive_crossings(series, threshold, tz);
                    debug!(
                        samples = series.len(),
                        days = events.len(),
                        "rebuilt gate events"
                    );
                    derived.publish(events);
                },
            )
            .await
    }

    async fn ensure_extremes(&self) {
        if self.extremes.is_stale(Utc::now()) {
            self.refresh_extremes().await;
        }
    }

    async fn ensure_heights(&self) {
        if self.heights.is_stale(Utc::now()) {
            self.refresh_heights().await;
        }
    }

    /// Tide extremes falling on the given local calendar day.
    pub async fn extremes_for_day(&self, day: NaiveDate) -> Vec<TideExtreme> {
        self.ensure_extremes().await;
        let Some(extremes) = self.extremes.get() else {
            return Vec::new();
        };
        extremes
            .iter()
            .filter(|e| e.at.with_timezone(&self.cfg.tz).date_naive() == day)
            .cloned()
            .collect()
    }

    /// A page of raw height samples, optionally restricted to a local-date
    /// range. Returns the page and the total sample count after filtering.
    pub async fn heights_page(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        offset: usize,
        limit: usize,
    ) -> (Vec<Sample>, usize) {
        self.ensure_heights().await;
        let Some(series) = self.heights.get() else {
            return (Vec::new(), 0);
        };
        if series.is_empty() {
            return (Vec::new(), 0);
        }

        let tz = self.cfg.tz;
        let matching: Vec<Sample> = series
            .samples()
            .iter()
            .filter(|s| {
                let day = s.at.with_timezone(&tz).date_naive();
                from.map_or(true, |f| day >= f) && to.map_or(true, |t| day <= t)
            })
            .copied()
            .collect();

        let total = matching.len();
        let page = matching.into_iter().skip(offset).take(limit).collect();
        (page, total)
    }

    /// Derived gate events for one local day; `None` when the day has no
    /// events, distinct from an internal failure.
    pub async fn gate_events_for_day(&self, day: NaiveDate) -> Option<Vec<GateEvent>> {
        self.ensure_heights().await;
        self.gate_events.get().get(&day).cloned()
    }

    pub async fn all_gate_events(&self) -> Arc<GateEventsByDay> {
        self.ensure_heights().await;
        self.gate_events.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use chrono::{DateTime, Duration, TimeZone};
    use chrono_tz::Europe::London;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration as StdDuration;

    fn test_config() -> Arc<Config> {
        Arc::new(Config {
            bind_addr: "127.0.0.1:0".into(),
            worldtides_key: Some("test".into()),
            openweather_key: None,
            gate_open_height: 4.0,
            lat: 53.28,
            lon: -3.83,
            tz: London,
            refresh_interval: StdDuration::from_secs(60 * 60 * 12),
            refresh_join_wait: StdDuration::from_secs(30),
            extremes_window_days: 365,
            heights_window_days: 180,
            extremes_max_age: Duration::hours(12),
            heights_max_age: Duration::days(7),
            weather_max_age: Duration::hours(12),
        })
    }

    fn fixture_series() -> SampleSeries {
        let points = [
            ("2025-06-01T09:00:00Z", 3.0),
            ("2025-06-01T09:30:00Z", 4.5),
            ("2025-06-01T15:00:00Z", 3.0),
        ];
        SampleSeries::new(
            points
                .iter()
                .map(|(t, h)| Sample {
                    at: t.parse::<DateTime<Utc>>().unwrap(),
                    height: *h,
                })
                .collect(),
        )
    }

    #[derive(Clone)]
    struct FakeProvider {
        heights_calls: Arc<AtomicUsize>,
        fail: Arc<AtomicBool>,
        delay: StdDuration,
    }

    impl FakeProvider {
        fn new() -> Self {
            Self {
                heights_calls: Arc::new(AtomicUsize::new(0)),
                fail: Arc::new(AtomicBool::new(false)),
                delay: StdDuration::ZERO,
            }
        }
    }

    impl TideProvider for FakeProvider {
        async fn fetch_extremes(&self, _start: NaiveDate, _days: u32) -> Result<Vec<TideExtreme>> {
            Ok(vec![TideExtreme {
                at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
                height: 7.2,
                kind: crate::domain::tide::model::ExtremeKind::High,
            }])
        }

        async fn fetch_heights(&self, _start: NaiveDate, _days: u32) -> Result<SampleSeries> {
            self.heights_calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                bail!("worldtides unavailable");
            }
            Ok(fixture_series())
        }
    }

    #[tokio::test]
    async fn heights_refresh_rebuilds_gate_events() {
        let service = TideService::new(test_config(), FakeProvider::new());

        let outcome = service.refresh_heights().await;
        assert_eq!(outcome, RefreshOutcome::Refreshed);

        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let events = service.gate_events_for_day(day).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, crate::domain::tide::model::Crossing::Up);
        assert_eq!(events[1].kind, crate::domain::tide::model::Crossing::Down);
        assert_eq!(
            events[0].at,
            "2025-06-01T09:20:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[tokio::test]
    async fn failed_refresh_leaves_samples_and_events_untouched() {
        let provider = FakeProvider::new();
        let service = TideService::new(test_config(), provider.clone());

        service.refresh_heights().await;
        let events_before = service.all_gate_events().await;
        let (samples_before, total_before) = service.heights_page(None, None, 0, 100).await;

        provider.fail.store(true, Ordering::SeqCst);
        let outcome = service.refresh_heights().await;
        assert_eq!(outcome, RefreshOutcome::Failed);

        let events_after = service.all_gate_events().await;
        let (samples_after, total_after) = service.heights_page(None, None, 0, 100).await;
        assert!(Arc::ptr_eq(&events_before, &events_after));
        assert_eq!(samples_before, samples_after);
        assert_eq!(total_before, total_after);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_height_refreshes_fetch_once() {
        let provider = FakeProvider {
            delay: StdDuration::from_millis(200),
            ..FakeProvider::new()
        };
        let service = Arc::new(TideService::new(test_config(), provider.clone()));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move { service.refresh_heights().await }));
        }
        for handle in handles {
            let outcome = handle.await.unwrap();
            assert!(matches!(
                outcome,
                RefreshOutcome::Refreshed | RefreshOutcome::Joined
            ));
        }

        assert_eq!(provider.heights_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn heights_page_filters_and_paginates() {
        let service = TideService::new(test_config(), FakeProvider::new());
        service.refresh_heights().await;

        let (page, total) = service.heights_page(None, None, 1, 1).await;
        assert_eq!(total, 3);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].height, 4.5);

        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let (page, total) = service.heights_page(Some(day), Some(day), 0, 100).await;
        assert_eq!(total, 3);
        assert_eq!(page.len(), 3);

        let other = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let (page, total) = service.heights_page(Some(other), None, 0, 100).await;
        assert_eq!(total, 0);
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn missing_day_is_not_found_rather_than_empty() {
        let service = TideService::new(test_config(), FakeProvider::new());
        service.refresh_heights().await;

        let missing = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert!(service.gate_events_for_day(missing).await.is_none());
    }

    #[tokio::test]
    async fn extremes_filtered_by_local_day() {
        let service = TideService::new(test_config(), FakeProvider::new());
        service.refresh_extremes().await;

        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(service.extremes_for_day(day).await.len(), 1);
        let other = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        assert!(service.extremes_for_day(other).await.is_empty());
    }
}
