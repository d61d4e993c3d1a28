use tracing::{debug, info};

use crate::app_state::AppState;
use crate::core::cache::cell::RefreshOutcome;

/// Refresh every cache, regardless of staleness. Failures are logged by the
/// cells and leave previous contents in place; gate events are re-derived
/// inside the heights refresh.
pub async fn run(state: &AppState) {
    debug!("running scheduled cache refresh");

    log_outcome("tide_extremes", state.tide.refresh_extremes().await);
    log_outcome("tide_heights", state.tide.refresh_heights().await);
    log_outcome("weather", state.weather.refresh().await);
}

fn log_outcome(cache: &str, outcome: RefreshOutcome) {
    match outcome {
        RefreshOutcome::Refreshed => info!(cache, "scheduled refresh complete"),
        // Failures were already logged with their cause by the cache cell.
        other => debug!(cache, outcome = ?other, "scheduled refresh did not publish"),
    }
}
