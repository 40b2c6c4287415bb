//! Output formatting module for CLI display
//!
//! Keeps terminal presentation apart from the scan itself.

use colored::Colorize;
use rust_decimal::Decimal;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::models::ScanOutcome;

/// Format a scan for terminal table output; opportunities are highlighted.
pub fn format_scan_table(outcome: &ScanOutcome, min_rate: Decimal) -> String {
    if outcome.all.is_empty() {
        return format!("{} No rates found in the table\n", "ℹ".blue().bold());
    }

    #[derive(Tabled)]
    struct RateRow {
        #[tabled(rename = "Plazo (días)")]
        term: u32,
        #[tabled(rename = "TNA")]
        rate: String,
    }

    let rows: Vec<RateRow> = outcome
        .all
        .iter()
        .map(|e| {
            let rate = format!("{:.2}%", e.rate_percent);
            RateRow {
                term: e.term_days,
                rate: if e.rate_percent > min_rate {
                    rate.green().bold().to_string()
                } else {
                    rate
                },
            }
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(0..), Alignment::right());

    let mut output = format!("\n{} Cauciones\n\n", "📈".cyan().bold());
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\n{} {} of {} above {}%\n",
        "✓".green().bold(),
        outcome.opportunities.len(),
        outcome.all.len(),
        min_rate.normalize()
    ));
    output
}

pub fn format_market_state(open: bool) -> String {
    if open {
        "open".green().to_string()
    } else {
        "closed".red().to_string()
    }
}
