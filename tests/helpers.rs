#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cauciones::config::Config;
use cauciones::error::{FetchError, NotifyError};
use cauciones::market::{MarketClock, MARKET_TZ};
use cauciones::notify::{Delivery, MessageSender};
use cauciones::pipeline::Pipeline;
use cauciones::scraping::TableSource;
use chrono::TimeZone;
use rust_decimal::Decimal;

/// Table source backed by fixed rows; counts how often it was hit.
pub struct FakeTable {
    rows: Result<Vec<Vec<String>>, ()>,
    pub calls: AtomicUsize,
}

impl FakeTable {
    pub fn rows(rows: &[(&str, &str)]) -> Self {
        Self {
            rows: Ok(rows
                .iter()
                .map(|(t, r)| vec![t.to_string(), r.to_string()])
                .collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fixture() -> Self {
        let html = std::fs::read_to_string("tests/fixtures/dolarito_cauciones.html")
            .expect("fixture html");
        let rows = cauciones::scraping::cauciones::extract_table_rows(&html).expect("rows");
        Self {
            rows: Ok(rows),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            rows: Err(()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TableSource for FakeTable {
    async fn fetch_rendered_table(&self, _url: &str) -> Result<Vec<Vec<String>>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.rows {
            Ok(rows) => Ok(rows.clone()),
            Err(()) => Err(FetchError::TableTimeout { secs: 15 }),
        }
    }
}

/// Message sender that records bodies, optionally failing with a provider code.
#[derive(Default)]
pub struct RecordingSender {
    pub bodies: Mutex<Vec<String>>,
    pub fail_with: Option<i64>,
}

impl RecordingSender {
    pub fn failing(code: i64) -> Self {
        Self {
            bodies: Mutex::new(Vec::new()),
            fail_with: Some(code),
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, body: &str) -> Result<Delivery, NotifyError> {
        self.bodies.lock().unwrap().push(body.to_string());
        match self.fail_with {
            Some(code) => Err(NotifyError::from_provider(code, "rejected", "whatsapp:+14155238886")),
            None => Ok(Delivery {
                sid: format!("SM{:04}", self.bodies.lock().unwrap().len()),
                status: "queued".to_string(),
            }),
        }
    }
}

/// Monday 2026-10-19 at 12:00 Buenos Aires
pub fn open_clock() -> MarketClock {
    MarketClock::pinned(MARKET_TZ.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap())
}

/// Saturday 2026-10-24 at 12:00 Buenos Aires
pub fn closed_clock() -> MarketClock {
    MarketClock::pinned(MARKET_TZ.with_ymd_and_hms(2026, 10, 24, 12, 0, 0).unwrap())
}

pub fn config_with(min_rate: Decimal, run_token: Option<&str>) -> Config {
    Config {
        min_rate,
        run_token: run_token.map(str::to_string),
        ..Config::default()
    }
}

pub fn pipeline(
    config: Config,
    table: Arc<FakeTable>,
    sender: Arc<RecordingSender>,
    clock: MarketClock,
) -> Arc<Pipeline> {
    Arc::new(Pipeline::new(Arc::new(config), table, sender, clock))
}
