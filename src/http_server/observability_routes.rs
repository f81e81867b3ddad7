//! Observability HTTP Routes
//!
//! Health check reporting the record count and log settings.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use crate::ledger::Ledger;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub records: usize,
    pub log_path: String,
    pub schema_policy: String,
    /// Present when startup recovery fell back to an empty store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_error: Option<String>,
}

/// Health check route
pub fn health_routes(ledger: Arc<Ledger>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(ledger)
}

async fn health_handler(State(ledger): State<Arc<Ledger>>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        records: ledger.len(),
        log_path: ledger.log_path().display().to_string(),
        schema_policy: ledger.policy().to_string(),
        recovery_error: ledger.recovery().error.clone(),
    };

    (StatusCode::OK, Json(response))
}
