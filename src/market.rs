//! Trading-hours check for the Buenos Aires caución market.

use chrono::{DateTime, Datelike, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::America::Argentina::Buenos_Aires;
use chrono_tz::Tz;

/// Market timezone
pub const MARKET_TZ: Tz = Buenos_Aires;

/// Opening time, inclusive
pub const OPEN: NaiveTime = hm(10, 30);
/// Closing time, inclusive
pub const CLOSE: NaiveTime = hm(17, 30);

const fn hm(hour: u32, minute: u32) -> NaiveTime {
    match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(time) => time,
        None => panic!("invalid market time"),
    }
}

/// Answers whether the market is open, either now or at a pinned instant.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketClock {
    pinned: Option<DateTime<Utc>>,
}

impl MarketClock {
    /// Clock that reads the system time on every call
    pub fn system() -> Self {
        Self { pinned: None }
    }

    /// Clock frozen at `at`
    pub fn pinned<Z: TimeZone>(at: DateTime<Z>) -> Self {
        Self {
            pinned: Some(at.with_timezone(&Utc)),
        }
    }

    /// Current instant in market time
    pub fn now(&self) -> DateTime<Tz> {
        self.pinned.unwrap_or_else(Utc::now).with_timezone(&MARKET_TZ)
    }

    pub fn is_market_open(&self) -> bool {
        is_open_at(self.now())
    }
}

/// Weekdays between 10:30:00 and 17:30:00 Buenos Aires time, both ends included.
pub fn is_open_at<Z: TimeZone>(at: DateTime<Z>) -> bool {
    let local = at.with_timezone(&MARKET_TZ);
    if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }

    let time = local.time();
    (OPEN..=CLOSE).contains(&time)
}
