use crate::config::SETTINGS;
use crate::methods::session;
use chrono::{Duration, Utc};
use log::debug;

const SWEEP_EVERY: std::time::Duration = std::time::Duration::from_secs(300);

/// Drops booking sessions nobody has touched within the idle window.
pub async fn session_sweeper() {
    let idle = Duration::minutes(SETTINGS.session_idle_minutes);
    loop {
        tokio::time::sleep(SWEEP_EVERY).await;
        let evicted = session::evict_idle(idle, Utc::now());
        debug!("session sweep finished, {} evicted", evicted);
    }
}
