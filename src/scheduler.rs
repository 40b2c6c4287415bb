//! Cron-driven background tasks: the periodic scan and the sandbox keep-alive.

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::ConfigError;
use crate::market::MARKET_TZ;
use crate::pipeline::Pipeline;

/// Every 2 days at 09:00, keeps the 72h sandbox session alive.
pub const REMINDER_SCHEDULE: &str = "0 9 */2 * *";

const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Normalize a crontab-style expression for the `cron` crate.
///
/// The `cron` crate wants `sec min hour day-of-month month day-of-week`, so a
/// 5-field expression gets `0` seconds prepended. Numeric days of week follow
/// crontab (`0` and `7` are Sunday, `1` is Monday) and are rewritten as day
/// names, since the `cron` crate counts from `1` = Sunday.
pub fn normalize_cron(expr: &str) -> String {
    let mut fields: Vec<String> = expr.split_whitespace().map(str::to_string).collect();
    if fields.len() == 5 {
        fields.insert(0, "0".to_string());
    }
    if fields.len() == 6 {
        if let Some(names) = weekday_names(&fields[5]) {
            fields[5] = names;
        }
    }
    fields.join(" ")
}

/// Expand a numeric crontab day-of-week field (`1-5`, `0,6`, `*/2`, `5-7`)
/// into a list of day names. `None` leaves the field as written: wildcards,
/// names, and anything the `cron` crate should reject itself.
fn weekday_names(field: &str) -> Option<String> {
    if field == "*" || field == "?" {
        return None;
    }

    let mut days = [false; 7];
    for part in field.split(',') {
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => (range, step.parse::<usize>().ok().filter(|s| *s > 0)?),
            None => (part, 1),
        };
        let (start, end) = match range.split_once('-') {
            Some((a, b)) => (a.parse::<usize>().ok()?, b.parse::<usize>().ok()?),
            None if range == "*" => (0, 7),
            None => {
                let day = range.parse::<usize>().ok()?;
                (day, if step > 1 { 7 } else { day })
            }
        };
        if start > end || end > 7 {
            return None;
        }
        for day in (start..=end).step_by(step) {
            days[day % 7] = true;
        }
    }

    let names: Vec<&str> = days
        .iter()
        .zip(WEEKDAY_NAMES)
        .filter(|(on, _)| **on)
        .map(|(_, name)| name)
        .collect();
    Some(names.join(","))
}

pub fn parse_schedule(expr: &str) -> Result<Schedule, ConfigError> {
    Schedule::from_str(&normalize_cron(expr)).map_err(|e| ConfigError::InvalidSchedule {
        expr: expr.to_string(),
        reason: e.to_string(),
    })
}

/// Run `job` at every tick of `schedule` (Buenos Aires time) until the
/// schedule has no further ticks.
pub async fn run_on_schedule<F, Fut>(name: &'static str, schedule: Schedule, mut job: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    loop {
        let Some((next, wait)) = next_run(&schedule, Utc::now()) else {
            warn!("{}: schedule has no upcoming ticks, stopping", name);
            return;
        };

        info!("{}: next run at {}", name, next);
        tokio::time::sleep(wait).await;

        job().await;
    }
}

/// Next tick after `now` in market time, and how long to sleep until it.
pub fn next_run(schedule: &Schedule, now: DateTime<Utc>) -> Option<(DateTime<Tz>, Duration)> {
    let next = schedule.after(&now.with_timezone(&MARKET_TZ)).next()?;
    let wait = (next.with_timezone(&Utc) - now).to_std().unwrap_or_default();
    Some((next, wait))
}

/// Spawn the periodic scan when a schedule is configured.
pub fn spawn_scan(pipeline: Arc<Pipeline>) -> Result<Option<JoinHandle<()>>, ConfigError> {
    let Some(expr) = pipeline.config().scan_schedule.clone() else {
        info!("CRON_SCHEDULE not set, scheduled scan disabled");
        return Ok(None);
    };
    let schedule = parse_schedule(&expr)?;
    info!("Scheduled scan enabled ({})", expr);

    let handle = tokio::spawn(run_on_schedule("scan", schedule, move || {
        let pipeline = pipeline.clone();
        async move {
            info!("Running scheduled scan");
            if let Err(e) = pipeline.run_scheduled().await {
                error!("Scheduled scan failed: {}", e);
            }
        }
    }));
    Ok(Some(handle))
}

/// Spawn the maintenance reminder.
pub fn spawn_reminder(pipeline: Arc<Pipeline>) -> Result<JoinHandle<()>, ConfigError> {
    let schedule = parse_schedule(REMINDER_SCHEDULE)?;

    Ok(tokio::spawn(run_on_schedule("reminder", schedule, move || {
        let pipeline = pipeline.clone();
        async move {
            pipeline.send_maintenance_reminder().await;
        }
    })))
}
