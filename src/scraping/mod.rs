// Web scraping module for the caución rate table
// Uses headless Chrome because dolarito.ar renders the table client-side

pub mod browser;
pub mod cauciones;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::error::FetchError;
use crate::models::{sort_by_rate_desc, RateEntry};

pub use browser::ChromeTableSource;

/// Capability to load a page and return the text of its table cells,
/// one `Vec<String>` per `table tbody tr`.
#[async_trait]
pub trait TableSource: Send + Sync {
    async fn fetch_rendered_table(&self, url: &str) -> Result<Vec<Vec<String>>, FetchError>;
}

/// Turns the rendered table into rates sorted by TNA, highest first.
#[derive(Clone)]
pub struct RateScraper {
    source: Arc<dyn TableSource>,
    url: String,
}

impl RateScraper {
    pub fn new(source: Arc<dyn TableSource>, url: impl Into<String>) -> Self {
        Self {
            source,
            url: url.into(),
        }
    }

    pub async fn fetch_rates(&self) -> Result<Vec<RateEntry>, FetchError> {
        let rows = self.source.fetch_rendered_table(&self.url).await?;
        let total_rows = rows.len();

        let mut entries: Vec<RateEntry> = rows
            .iter()
            .filter_map(|cells| cauciones::parse_row(cells.as_slice()))
            .collect();
        sort_by_rate_desc(&mut entries);

        info!(
            "Parsed {} rate(s) from {} table row(s)",
            entries.len(),
            total_rows
        );
        Ok(entries)
    }
}
