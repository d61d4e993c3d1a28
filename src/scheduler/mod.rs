//! Background refresh driver.

pub mod tasks;

use tokio::time::MissedTickBehavior;

use crate::app_state::AppState;

/// Run the periodic refresh loop for the process lifetime. The first tick
/// fires immediately, which doubles as the startup cache load.
pub async fn run(state: AppState) {
    let mut ticker = tokio::time::interval(state.config.refresh_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        tasks::refresh::run(&state).await;
    }
}
