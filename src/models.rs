//! Rate data shared by the scraper, filter and notifier.

use rust_decimal::Decimal;
use serde::Serialize;

/// One row of the caución table: a term and its annualised nominal rate (TNA).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateEntry {
    #[serde(rename = "plazo_dias")]
    pub term_days: u32,
    #[serde(rename = "tasa_actual", with = "rust_decimal::serde::float")]
    pub rate_percent: Decimal,
}

impl RateEntry {
    pub fn new(term_days: u32, rate_percent: Decimal) -> Self {
        Self {
            term_days,
            rate_percent,
        }
    }
}

/// Result of one scrape+filter cycle.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Every parsed row, highest rate first
    pub all: Vec<RateEntry>,
    /// Rows above the configured threshold, same order as `all`
    pub opportunities: Vec<RateEntry>,
}

/// Sort rates descending by TNA.
pub fn sort_by_rate_desc(entries: &mut [RateEntry]) {
    entries.sort_unstable_by(|a, b| b.rate_percent.cmp(&a.rate_percent));
}
