//! Scrape → filter → notify, shared by every trigger.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::FetchError;
use crate::market::MarketClock;
use crate::models::{RateEntry, ScanOutcome};
use crate::notify::{Delivery, MessageSender, Notifier, TwilioClient};
use crate::opportunities::filter_opportunities;
use crate::scraping::{ChromeTableSource, RateScraper, TableSource};

/// What a scheduled run ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    MarketClosed,
    Scanned { total: usize, opportunities: usize, notified: bool },
}

pub struct Pipeline {
    config: Arc<Config>,
    scraper: RateScraper,
    notifier: Notifier,
    clock: MarketClock,
}

impl Pipeline {
    pub fn new(
        config: Arc<Config>,
        source: Arc<dyn TableSource>,
        sender: Arc<dyn MessageSender>,
        clock: MarketClock,
    ) -> Self {
        let scraper = RateScraper::new(source, config.source_url.clone());
        let notifier = Notifier::new(sender, config.min_rate);
        Self {
            config,
            scraper,
            notifier,
            clock,
        }
    }

    /// Production wiring: headless Chrome, Twilio, system clock.
    pub fn from_config(config: Config) -> Self {
        let sender = Arc::new(TwilioClient::new(config.twilio.clone()));
        Self::new(
            Arc::new(config),
            Arc::new(ChromeTableSource::new()),
            sender,
            MarketClock::system(),
        )
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clock(&self) -> &MarketClock {
        &self.clock
    }

    pub fn min_rate(&self) -> Decimal {
        self.config.min_rate
    }

    pub fn market_open(&self) -> bool {
        self.clock.is_market_open()
    }

    /// Fetch all rates and pick the ones above the threshold.
    pub async fn scan(&self) -> Result<ScanOutcome, FetchError> {
        let all = self.scraper.fetch_rates().await?;
        let opportunities = filter_opportunities(&all, self.config.min_rate);
        Ok(ScanOutcome { all, opportunities })
    }

    /// Notify and swallow the error; the notifier already logged it.
    pub async fn notify_logged(&self, opportunities: &[RateEntry]) -> Option<Delivery> {
        self.notifier.notify(opportunities).await.ok().flatten()
    }

    /// Scheduled-trigger policy: skip outside market hours, otherwise scan and
    /// notify when something beats the threshold.
    pub async fn run_scheduled(&self) -> Result<CycleReport, FetchError> {
        if !self.market_open() {
            info!("Outside market hours, skipping scan");
            return Ok(CycleReport::MarketClosed);
        }

        let outcome = self.scan().await?;
        info!(
            "Scan finished. Total: {}. Opportunities (> {}%): {}",
            outcome.all.len(),
            self.config.min_rate.normalize(),
            outcome.opportunities.len()
        );

        let mut notified = false;
        if !outcome.opportunities.is_empty() {
            info!(
                "Found {} opportunities, notifying",
                outcome.opportunities.len()
            );
            notified = self.notify_logged(&outcome.opportunities).await.is_some();
        }

        Ok(CycleReport::Scanned {
            total: outcome.all.len(),
            opportunities: outcome.opportunities.len(),
            notified,
        })
    }

    /// Keep-alive message for the WhatsApp sandbox. Failures are only logged.
    pub async fn send_maintenance_reminder(&self) {
        match self.notifier.send_reminder().await {
            Ok(_) => {}
            Err(e) if e.is_session_expired() => {
                error!("⚠️  SANDBOX ALERT: {}", e);
            }
            Err(e) => {
                warn!("Failed to send maintenance reminder: {}", e);
            }
        }
    }
}
