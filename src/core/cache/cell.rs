//! In-memory cache cells with single-flight refresh.
//!
//! A `CacheCell` owns one independently refreshable snapshot (tide heights,
//! tide extremes, weather). Readers take `Arc` snapshots and never block on a
//! refresh; writers replace the snapshot wholesale. At most one refresh per
//! cell runs at a time: concurrent triggers join the in-flight one and wait
//! for it with a bounded timeout instead of issuing duplicate upstream
//! fetches.

use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

/// How a call to [`CacheCell::refresh`] was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// This caller led the refresh and new data was published.
    Refreshed,
    /// This caller led the refresh and the fetch failed; previous contents
    /// were kept.
    Failed,
    /// A refresh was already in flight and completed while we waited.
    Joined,
    /// A refresh was already in flight and we gave up waiting for it.
    TimedOut,
}

struct Published<T> {
    value: Arc<T>,
    fetched_at: DateTime<Utc>,
}

struct CellInner<T> {
    name: &'static str,
    max_age: Duration,
    slot: RwLock<Option<Published<T>>>,
    leader: Arc<Mutex<()>>,
    // Bumped once per finished refresh cycle, success or failure, so that
    // joiners always wake.
    cycle: watch::Sender<u64>,
}

impl<T> CellInner<T> {
    fn store(&self, value: T, fetched_at: DateTime<Utc>, after_publish: impl FnOnce(&T)) {
        let value = Arc::new(value);
        {
            let mut slot = self.slot.write().unwrap();
            *slot = Some(Published {
                value: Arc::clone(&value),
                fetched_at,
            });
        }
        // Derived data is rebuilt after the samples land but before the
        // cycle counter is bumped, so a joiner never observes derived state
        // older than the samples it joined for.
        after_publish(&value);
    }
}

pub struct CacheCell<T> {
    inner: Arc<CellInner<T>>,
}

impl<T> Clone for CacheCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + Sync + 'static> CacheCell<T> {
    pub fn new(name: &'static str, max_age: Duration) -> Self {
        let (cycle, _) = watch::channel(0);
        Self {
            inner: Arc::new(CellInner {
                name,
                max_age,
                slot: RwLock::new(None),
                leader: Arc::new(Mutex::new(())),
                cycle,
            }),
        }
    }

    /// Current snapshot, if one was ever published.
    pub fn get(&self) -> Option<Arc<T>> {
        let slot = self.inner.slot.read().unwrap();
        slot.as_ref().map(|p| Arc::clone(&p.value))
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        let slot = self.inner.slot.read().unwrap();
        slot.as_ref().map(|p| p.fetched_at)
    }

    /// Stale when never populated, or older than the cell's max age.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.last_refreshed() {
            None => true,
            Some(at) => now - at > self.inner.max_age,
        }
    }

    /// Run `fetch` and publish its result, unless a refresh is already in
    /// flight, in which case wait for that one (bounded by `join_wait`).
    pub async fn refresh<F>(&self, join_wait: StdDuration, fetch: F) -> RefreshOutcome
    where
        F: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        self.refresh_then(join_wait, fetch, |_| {}).await
    }

    /// As [`refresh`](Self::refresh), additionally invoking `after_publish`
    /// on the freshly published value before joiners are woken. Used to keep
    /// derived snapshots consistent with their source within one cycle.
    pub async fn refresh_then<F, H>(
        &self,
        join_wait: StdDuration,
        fetch: F,
        after_publish: H,
    ) -> RefreshOutcome
    where
        F: Future<Output = anyhow::Result<T>> + Send + 'static,
        H: FnOnce(&T) + Send + 'static,
    {
        // Subscribe before the lock attempt so a cycle finishing in between
        // cannot be missed.
        let mut rx = self.inner.cycle.subscribe();

        let guard = match self.inner.leader.clone().try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                return match tokio::time::timeout(join_wait, rx.changed()).await {
                    Ok(_) => RefreshOutcome::Joined,
                    Err(_) => {
                        debug!(
                            cache = self.inner.name,
                            "gave up waiting for in-flight refresh, serving cached data"
                        );
                        RefreshOutcome::TimedOut
                    }
                };
            }
        };

        // The fetch runs in its own task, holding the leader guard, so a
        // caller that disconnects abandons only its wait, never the fetch.
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            let _guard = guard;
            let outcome = match fetch.await {
                Ok(value) => {
                    inner.store(value, Utc::now(), after_publish);
                    debug!(cache = inner.name, "cache refreshed");
                    RefreshOutcome::Refreshed
                }
                Err(err) => {
                    warn!(
                        cache = inner.name,
                        error = %err,
                        "refresh failed, keeping previous contents"
                    );
                    RefreshOutcome::Failed
                }
            };
            inner.cycle.send_modify(|cycle| *cycle = cycle.wrapping_add(1));
            outcome
        });

        handle.await.unwrap_or(RefreshOutcome::Failed)
    }
}

/// Snapshot store for data derived from a `CacheCell`, rebuilt in full and
/// swapped atomically by the refresh that changed its input.
pub struct DerivedCell<T> {
    slot: Arc<RwLock<Arc<T>>>,
}

impl<T> Clone for DerivedCell<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: Default> Default for DerivedCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default> DerivedCell<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(RwLock::new(Arc::new(T::default()))),
        }
    }
}

impl<T> DerivedCell<T> {
    pub fn get(&self) -> Arc<T> {
        Arc::clone(&self.slot.read().unwrap())
    }

    pub fn publish(&self, value: T) {
        *self.slot.write().unwrap() = Arc::new(value);
    }
}
