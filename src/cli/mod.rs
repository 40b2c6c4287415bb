use clap::{Parser, Subcommand};

pub mod formatters;

#[derive(Parser)]
#[command(name = "cauciones")]
#[command(version, about = "Caución rate monitor with WhatsApp alerts")]
#[command(
    long_about = "Scrapes the caución rate table from dolarito.ar, filters terms paying more than MIN_TNA and sends WhatsApp alerts through Twilio during market hours."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server and the scheduled tasks (default)
    Serve,

    /// Run one scan with the scheduled-trigger policy and exit
    Scan {
        /// Ignore market hours, print the rates and send nothing
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Print whether the market is open
    Market {
        /// Check this instant instead of now (RFC 3339, e.g. 2026-10-19T10:30:00-03:00)
        #[arg(long)]
        at: Option<String>,
    },
}
