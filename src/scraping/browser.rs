// Headless Chrome implementation of `TableSource`
//
// A fresh browser is launched for every fetch and dropped when the fetch
// returns, which terminates the Chrome process on success and on every error
// path alike.

use std::ffi::OsStr;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use tracing::{debug, info};

use super::cauciones::extract_table_rows;
use super::TableSource;
use crate::error::FetchError;

/// Deadline for the page to finish loading
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);
/// Deadline for the rate table to appear once the page has loaded
pub const TABLE_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Default)]
pub struct ChromeTableSource;

impl ChromeTableSource {
    pub fn new() -> Self {
        Self
    }

    fn launch() -> Result<Browser, FetchError> {
        let options = LaunchOptions {
            headless: true,
            sandbox: false, // Chrome sandbox is unavailable in most containers
            args: vec![
                OsStr::new("--disable-setuid-sandbox"),
                // Use /tmp instead of the small /dev/shm of containers
                OsStr::new("--disable-dev-shm-usage"),
            ],
            ..Default::default()
        };

        Browser::new(options).map_err(|e| {
            FetchError::Launch(format!("{:#}. Is Chrome/Chromium installed?", e))
        })
    }

    /// Blocking part of the fetch; runs on tokio's blocking pool.
    fn fetch_blocking(url: &str) -> Result<Vec<Vec<String>>, FetchError> {
        info!("Launching headless Chrome for {}", url);
        let browser = Self::launch()?;

        let tab = browser.new_tab().map_err(|e| FetchError::Navigation {
            url: url.to_string(),
            reason: format!("could not open tab: {:#}", e),
        })?;
        tab.set_default_timeout(NAVIGATION_TIMEOUT);

        tab.navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| FetchError::Navigation {
                url: url.to_string(),
                reason: format!("{:#}", e),
            })?;

        debug!("Page loaded, waiting for rate table");
        tab.wait_for_element_with_custom_timeout("table", TABLE_TIMEOUT)
            .map_err(|_| FetchError::TableTimeout {
                secs: TABLE_TIMEOUT.as_secs(),
            })?;

        let html = tab
            .get_content()
            .map_err(|e| FetchError::Content(format!("{:#}", e)))?;

        extract_table_rows(&html)
    }
}

#[async_trait]
impl TableSource for ChromeTableSource {
    async fn fetch_rendered_table(&self, url: &str) -> Result<Vec<Vec<String>>, FetchError> {
        let url = url.to_string();
        tokio::task::spawn_blocking(move || Self::fetch_blocking(&url))
            .await
            .map_err(|e| FetchError::Worker(e.to_string()))?
    }
}
