//! HTTP trigger surfaces.

mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::json;
use tracing::{error, info};

use crate::pipeline::Pipeline;

pub use routes::CaucionesResponse;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    routes::routes().with_state(AppState { pipeline })
}

/// Bind on all interfaces and serve until the process exits.
pub async fn serve(pipeline: Arc<Pipeline>) -> crate::error::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], pipeline.config().port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on port {}", addr.port());

    axum::serve(listener, router(pipeline))
        .await
        .context("HTTP server stopped")
}

/// Pipeline failure rendered as a 500 with the error message.
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("{:#}", self.0) })),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
