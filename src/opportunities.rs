use rust_decimal::Decimal;

use crate::models::RateEntry;

/// Keep the entries paying strictly more than `min_rate`, preserving order.
pub fn filter_opportunities(entries: &[RateEntry], min_rate: Decimal) -> Vec<RateEntry> {
    entries
        .iter()
        .filter(|e| e.rate_percent > min_rate)
        .cloned()
        .collect()
}
