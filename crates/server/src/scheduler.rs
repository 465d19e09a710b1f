//! # Nightly Sync Scheduler
//!
//! Optionally runs the sentiment aggregator once a day at a configured local
//! hour, in the background of the server process.

use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone};
use familycare::{AggregateError, SentimentAggregator};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// The first instant strictly after `now` whose local hour is `hour`.
///
/// Hours above 23 are clamped to 23. When the wall-clock time does not exist
/// on a day (a DST gap) the following day is used.
pub fn next_run_after<Tz: TimeZone>(now: &DateTime<Tz>, hour: u32) -> DateTime<Tz> {
    let time = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let tz = now.timezone();
    let mut day = now.date_naive();
    for _ in 0..3 {
        if let Some(candidate) = tz.from_local_datetime(&day.and_time(time)).earliest() {
            if candidate > *now {
                return candidate;
            }
        }
        day = day.succ_opt().unwrap_or(day);
    }
    now.clone() + Duration::days(1)
}

/// Spawns the daily trigger. Each run's outcome is logged; failures never stop the loop.
pub fn spawn_nightly_sync(aggregator: Arc<SentimentAggregator>, hour: u32) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let now = Local::now();
            let next = next_run_after(&now, hour);
            info!("Next nightly sync scheduled for {next}.");
            let wait = (next - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            match aggregator.run().await {
                Ok(outcome) => info!(
                    "Nightly sync finished with {} report(s).",
                    outcome.report_count()
                ),
                Err(AggregateError::AlreadyRunning) => {
                    warn!("Nightly sync skipped: a run is already in progress.")
                }
                Err(e) => error!("Nightly sync failed: {e}"),
            }
        }
    })
}
