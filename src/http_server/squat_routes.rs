//! Squat record HTTP Routes
//!
//! - `POST /squat`: store one record (201, or 400 for a bad body)
//! - `GET /squats`: every record in insertion order

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use super::errors::{ApiError, ApiResult};
use crate::ledger::Ledger;
use crate::observability::{log_event_with_fields, Event};
use crate::record::Record;

#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub status: &'static str,
}

/// Create squat record routes
pub fn squat_routes(ledger: Arc<Ledger>) -> Router {
    Router::new()
        .route("/squat", post(create_squat_handler))
        .route("/squats", get(list_squats_handler))
        .with_state(ledger)
}

/// Accept one record.
///
/// The body is decoded from raw bytes rather than through `Json<T>`, so the
/// content type is not checked and every bad body (invalid JSON, non-object,
/// empty object) is a 400.
async fn create_squat_handler(
    State(ledger): State<Arc<Ledger>>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<AckResponse>)> {
    let record = parse_record(&body).map_err(|e| {
        log_event_with_fields(Event::PayloadRejected, &[("reason", e.to_string().as_str())]);
        e
    })?;

    // The ledger fsyncs under its write lock; keep that off the async workers.
    // A failed disk append is logged by the ledger and not surfaced here.
    tokio::task::spawn_blocking(move || ledger.record(record))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok((StatusCode::CREATED, Json(AckResponse { status: "ok" })))
}

async fn list_squats_handler(State(ledger): State<Arc<Ledger>>) -> ApiResult<Json<Vec<Record>>> {
    Ok(Json(ledger.records()?))
}

fn parse_record(body: &[u8]) -> ApiResult<Record> {
    let value: Value = serde_json::from_slice(body)?;
    Ok(Record::from_json(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record() {
        assert!(parse_record(br#"{"count": 5}"#).is_ok());
        assert!(matches!(parse_record(b""), Err(ApiError::InvalidPayload(_))));
        assert!(matches!(parse_record(b"{}"), Err(ApiError::InvalidPayload(_))));
        assert!(matches!(parse_record(b"[1,2]"), Err(ApiError::InvalidPayload(_))));
        assert!(matches!(parse_record(b"{not json"), Err(ApiError::InvalidPayload(_))));
    }

    #[test]
    fn test_ack_serialization() {
        let json = serde_json::to_string(&AckResponse { status: "ok" }).unwrap();
        assert_eq!(json, r#"{"status":"ok"}"#);
    }
}
