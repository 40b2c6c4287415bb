// Parsing of the dolarito.ar caución table
//
// Each body row holds the term ("1 día", "7 días") in the first cell and the
// TNA ("31,50%", "1.234,5 %") in the second. Anything else is ignored.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use tracing::debug;

use crate::error::FetchError;
use crate::models::RateEntry;

static TERM_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(\d+)").ok());
static RATE_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)").ok());

/// Extract the trimmed text of every `td` of every `table tbody tr`.
pub fn extract_table_rows(html: &str) -> Result<Vec<Vec<String>>, FetchError> {
    let document = Html::parse_document(html);
    let row_sel = Selector::parse("table tbody tr")
        .map_err(|e| FetchError::Content(format!("invalid row selector: {}", e)))?;
    let cell_sel = Selector::parse("td")
        .map_err(|e| FetchError::Content(format!("invalid cell selector: {}", e)))?;

    let rows = document
        .select(&row_sel)
        .map(|row| {
            row.select(&cell_sel)
                .map(|cell| {
                    cell.text()
                        .collect::<Vec<_>>()
                        .join(" ")
                        .split_whitespace()
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect()
        })
        .collect();

    Ok(rows)
}

/// Build a rate from one table row. `None` when the row has fewer than two
/// cells or either value does not parse.
pub fn parse_row<S: AsRef<str>>(cells: &[S]) -> Option<RateEntry> {
    if cells.len() < 2 {
        return None;
    }

    let term = cells[0].as_ref();
    let rate = cells[1].as_ref();

    match (parse_term_days(term), parse_rate_percent(rate)) {
        (Some(term_days), Some(rate_percent)) => Some(RateEntry::new(term_days, rate_percent)),
        _ => {
            debug!("Skipping unparseable row: {:?} / {:?}", term, rate);
            None
        }
    }
}

/// First run of digits in the cell, e.g. `"7 días"` -> 7.
pub fn parse_term_days(text: &str) -> Option<u32> {
    let caps = TERM_RE.as_ref()?.captures(text)?;
    caps.get(1)?.as_str().parse().ok()
}

/// TNA from cell text using Argentine separators.
///
/// With a comma present, dots are thousands separators and the comma is the
/// decimal point (`1.234,56` -> 1234.56). Without one, a dot is the decimal
/// point (`31.5` -> 31.5).
pub fn parse_rate_percent(text: &str) -> Option<Decimal> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let normalized = if compact.contains(',') {
        compact.replace('.', "").replacen(',', ".", 1)
    } else {
        compact
    };

    let caps = RATE_RE.as_ref()?.captures(&normalized)?;
    Decimal::from_str(caps.get(1)?.as_str()).ok()
}
