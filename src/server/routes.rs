use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::{AppError, AppState};
use crate::models::RateEntry;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/cauciones", get(get_cauciones))
        .route("/run", get(run))
        .route("/health", get(health))
}

#[derive(Debug, Deserialize)]
pub struct CaucionesQuery {
    notificar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CaucionesResponse {
    pub timestamp: String,
    pub mercado_abierto: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub min_tna_config: Decimal,
    pub cantidad_encontrada: usize,
    pub oportunidades_detectadas: usize,
    pub data: Vec<RateEntry>,
}

async fn get_cauciones(
    State(state): State<AppState>,
    Query(query): Query<CaucionesQuery>,
) -> Result<Json<CaucionesResponse>, AppError> {
    let pipeline = &state.pipeline;
    let outcome = pipeline.scan().await?;
    let market_open = pipeline.market_open();

    if query.notificar.as_deref() == Some("true") && market_open {
        pipeline.notify_logged(&outcome.opportunities).await;
    }

    Ok(Json(CaucionesResponse {
        timestamp: pipeline.clock().now().to_rfc3339(),
        mercado_abierto: market_open,
        min_tna_config: pipeline.min_rate(),
        cantidad_encontrada: outcome.all.len(),
        oportunidades_detectadas: outcome.opportunities.len(),
        data: outcome.all,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RunQuery {
    token: Option<String>,
}

/// Token-gated full run: 401 bad token, 204 market closed, 200 done.
async fn run(
    State(state): State<AppState>,
    Query(query): Query<RunQuery>,
) -> Result<StatusCode, AppError> {
    let pipeline = &state.pipeline;
    let expected = pipeline.config().run_token.as_deref();
    if !token_matches(expected, query.token.as_deref()) {
        warn!("Rejected /run request with missing or invalid token");
        return Ok(StatusCode::UNAUTHORIZED);
    }

    if !pipeline.market_open() {
        info!("/run called outside market hours");
        return Ok(StatusCode::NO_CONTENT);
    }

    let outcome = pipeline.scan().await?;
    info!(
        "/run scan finished. Total: {}. Opportunities: {}",
        outcome.all.len(),
        outcome.opportunities.len()
    );
    pipeline.notify_logged(&outcome.opportunities).await;

    Ok(StatusCode::OK)
}

async fn health() -> &'static str {
    "ok"
}

/// Compare SHA-256 digests so the comparison time does not depend on where
/// the strings differ. No configured token means every request is rejected.
fn token_matches(expected: Option<&str>, provided: Option<&str>) -> bool {
    match (expected, provided) {
        (Some(expected), Some(provided)) => {
            Sha256::digest(expected.as_bytes()) == Sha256::digest(provided.as_bytes())
        }
        _ => false,
    }
}
