//! HTTP trigger tests driven through the router without a socket.

mod helpers;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use cauciones::market::MarketClock;
use cauciones::server::router;
use helpers::{closed_clock, config_with, open_clock, pipeline, FakeTable, RecordingSender};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use tower::ServiceExt;

struct Harness {
    table: Arc<FakeTable>,
    sender: Arc<RecordingSender>,
    app: axum::Router,
}

fn harness(min_rate: Decimal, token: Option<&str>, clock: MarketClock, table: FakeTable) -> Harness {
    let table = Arc::new(table);
    let sender = Arc::new(RecordingSender::default());
    let p = pipeline(config_with(min_rate, token), table.clone(), sender.clone(), clock);
    Harness {
        table,
        sender,
        app: router(p),
    }
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn cauciones_returns_summary_json() {
    let h = harness(dec!(30), None, open_clock(), FakeTable::fixture());

    let (status, body) = get(h.app, "/api/cauciones").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["mercado_abierto"], true);
    assert_eq!(json["min_tna_config"], 30.0);
    assert_eq!(json["cantidad_encontrada"], 5);
    assert_eq!(json["oportunidades_detectadas"], 3);
    assert_eq!(json["data"][0]["plazo_dias"], 1);
    assert_eq!(json["data"][0]["tasa_actual"], 31.5);
    assert_eq!(json["data"].as_array().unwrap().len(), 5);
    assert!(json["timestamp"].as_str().unwrap().starts_with("2026-10-19T12:00:00"));
    assert!(h.sender.sent().is_empty(), "no notification without notificar=true");
}

#[tokio::test]
async fn cauciones_notifies_when_requested_and_open() {
    let h = harness(dec!(30), None, open_clock(), FakeTable::fixture());

    let (status, _) = get(h.app, "/api/cauciones?notificar=true").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.sender.sent().len(), 1);
}

#[tokio::test]
async fn cauciones_does_not_notify_when_closed() {
    let h = harness(dec!(30), None, closed_clock(), FakeTable::fixture());

    let (status, body) = get(h.app, "/api/cauciones?notificar=true").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["mercado_abierto"], false);
    assert_eq!(h.table.call_count(), 1, "query endpoint scans regardless of hours");
    assert!(h.sender.sent().is_empty());
}

#[tokio::test]
async fn cauciones_scrape_failure_is_500() {
    let h = harness(Decimal::ZERO, None, open_clock(), FakeTable::failing());

    let (status, body) = get(h.app, "/api/cauciones").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("rate table"));
}

#[tokio::test]
async fn run_rejects_bad_token() {
    let h = harness(Decimal::ZERO, Some("s3cret"), open_clock(), FakeTable::fixture());
    let (status, _) = get(h.app.clone(), "/run?token=nope").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get(h.app, "/run").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(h.table.call_count(), 0);
}

#[tokio::test]
async fn run_rejects_everything_without_configured_token() {
    let h = harness(Decimal::ZERO, None, open_clock(), FakeTable::fixture());
    let (status, _) = get(h.app, "/run?token=").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn run_outside_market_hours_is_no_content() {
    let h = harness(Decimal::ZERO, Some("s3cret"), closed_clock(), FakeTable::fixture());

    let (status, body) = get(h.app, "/run?token=s3cret").await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
    assert_eq!(h.table.call_count(), 0);
    assert!(h.sender.sent().is_empty());
}

#[tokio::test]
async fn run_scans_and_notifies() {
    let h = harness(dec!(30), Some("s3cret"), open_clock(), FakeTable::fixture());

    let (status, body) = get(h.app, "/run?token=s3cret").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    assert_eq!(h.table.call_count(), 1);
    assert_eq!(h.sender.sent().len(), 1);
}

#[tokio::test]
async fn run_scrape_failure_is_500() {
    let h = harness(Decimal::ZERO, Some("s3cret"), open_clock(), FakeTable::failing());
    let (status, _) = get(h.app, "/run?token=s3cret").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn health_is_ok() {
    let h = harness(Decimal::ZERO, None, open_clock(), FakeTable::fixture());
    let (status, body) = get(h.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}
