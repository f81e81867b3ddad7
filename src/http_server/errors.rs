//! # API Errors
//!
//! Request-scoped errors and their HTTP mapping. None of them change the
//! shared store.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::ledger::LedgerError;
use crate::record::RecordError;

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Body is not a non-empty JSON object
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Refused by the `reject` schema policy
    #[error("record fields not in log header: {}", .0.join(", "))]
    SchemaMismatch(Vec<String>),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::SchemaMismatch(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        ApiError::InvalidPayload(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InvalidPayload(err.to_string())
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::SchemaMismatch { fields } => ApiError::SchemaMismatch(fields),
            LedgerError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::InvalidPayload("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::SchemaMismatch(vec!["depth".to_string()]).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::Internal("x".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_record_error() {
        let err = ApiError::from(RecordError::Empty);
        assert!(matches!(err, ApiError::InvalidPayload(_)));
    }

    #[test]
    fn test_from_ledger_error() {
        let err = ApiError::from(LedgerError::SchemaMismatch {
            fields: vec!["depth".to_string()],
        });
        assert_eq!(err.to_string(), "record fields not in log header: depth");

        let err = ApiError::from(LedgerError::Store(StoreError::LockPoisoned));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_response_body() {
        let body = ErrorResponse::from(ApiError::InvalidPayload("empty".to_string()));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], 400);
        assert_eq!(json["error"], "invalid payload: empty");
    }
}
