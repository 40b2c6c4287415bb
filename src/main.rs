use std::sync::Arc;

use anyhow::{Context, Result};
use cauciones::cli::{formatters, Cli, Commands};
use cauciones::config::Config;
use cauciones::market::MarketClock;
use cauciones::pipeline::{CycleReport, Pipeline};
use cauciones::{scheduler, server};
use chrono::DateTime;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging on stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => handle_serve().await,
        Commands::Scan { dry_run } => handle_scan(dry_run).await,
        Commands::Market { at } => handle_market(at.as_deref()),
    }
}

fn load_pipeline() -> Result<Arc<Pipeline>> {
    let config = Config::from_env().context("invalid configuration")?;
    Ok(Arc::new(Pipeline::from_config(config)))
}

async fn handle_serve() -> Result<()> {
    let pipeline = load_pipeline()?;

    scheduler::spawn_scan(pipeline.clone())?;
    scheduler::spawn_reminder(pipeline.clone())?;

    server::serve(pipeline).await
}

/// One-shot run, for hosts that schedule the binary externally.
async fn handle_scan(dry_run: bool) -> Result<()> {
    let pipeline = load_pipeline()?;

    if dry_run {
        let outcome = pipeline.scan().await.context("scan failed")?;
        print!("{}", formatters::format_scan_table(&outcome, pipeline.min_rate()));
        return Ok(());
    }

    match pipeline.run_scheduled().await.context("scan failed")? {
        CycleReport::MarketClosed => println!("Market closed, nothing scanned"),
        CycleReport::Scanned {
            total,
            opportunities,
            notified,
        } => {
            info!("Scan complete");
            println!(
                "Total: {}. Opportunities (> {}%): {}. Notified: {}",
                total,
                pipeline.min_rate().normalize(),
                opportunities,
                if notified { "yes" } else { "no" }
            );
        }
    }
    Ok(())
}

fn handle_market(at: Option<&str>) -> Result<()> {
    let clock = match at {
        Some(raw) => {
            let at = DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("invalid --at timestamp: {}", raw))?;
            MarketClock::pinned(at)
        }
        None => MarketClock::system(),
    };

    println!(
        "{} {}",
        clock.now().format("%Y-%m-%d %H:%M:%S %Z"),
        formatters::format_market_state(clock.is_market_open())
    );
    Ok(())
}
