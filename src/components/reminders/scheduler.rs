use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration as TokioDuration};
use tracing::{error, info};

use super::dispatcher::NotificationDispatcher;
use super::notifications::run_daily_check;
use crate::components::store::StoreHandle;
use crate::config::Config;
use crate::error::{config_error, MementoResult};
use crate::utils::time::{calculate_wait_duration, next_daily_time};

/// When the next check runs and which local day it covers
#[derive(Debug, Clone, PartialEq)]
pub struct NextCheck {
    pub at: DateTime<Tz>,
    pub wait_secs: u64,
    /// Local date in the configured timezone at `at`
    pub today: NaiveDate,
}

/// Work out the next daily check after `now`
pub fn plan_next_check(config: &Config, now: DateTime<Utc>) -> MementoResult<NextCheck> {
    let tz = config.tz()?;
    let now = now.with_timezone(&tz);
    let at = next_daily_time(&now, &config.reminder_check_time).ok_or_else(|| {
        config_error(&format!(
            "Failed to calculate next reminder check from '{}'",
            config.reminder_check_time
        ))
    })?;

    Ok(NextCheck {
        wait_secs: calculate_wait_duration(&now, &at),
        today: at.date_naive(),
        at,
    })
}

/// Start the daily reminder loop
pub fn start_scheduler(
    config: Arc<RwLock<Config>>,
    store: StoreHandle,
    dispatcher: Arc<dyn NotificationDispatcher>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            // Re-read each round so config reloads take effect
            let config_snapshot = config.read().await.clone();
            let next = match plan_next_check(&config_snapshot, Utc::now()) {
                Ok(next) => next,
                Err(e) => {
                    error!("Cannot schedule reminder check: {}", e);
                    sleep(TokioDuration::from_secs(3600)).await; // Retry in an hour
                    continue;
                }
            };

            info!("Next reminder check scheduled for {}", next.at);
            sleep(TokioDuration::from_secs(next.wait_secs)).await;

            let today = next.today;
            match run_daily_check(&config_snapshot, store.as_ref(), dispatcher.as_ref(), today).await {
                Ok(summary) => info!(
                    "Reminder check for {} done: {} sent, {} failed, digest {}",
                    today,
                    summary.reminders_sent,
                    summary.reminders_failed,
                    if summary.digest_sent { "sent" } else { "not due" }
                ),
                Err(e) => error!("Reminder check for {} failed: {}", today, e),
            }
        }
    })
}
