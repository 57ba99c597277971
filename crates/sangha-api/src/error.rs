//! API error handling
//!
//! Maps the ledger and store error taxonomy onto HTTP status codes with a
//! uniform `{ code, message }` body. No failure here is fatal to the
//! process; each is scoped to its request.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sangha_ledger::LedgerError;
use sangha_store::StoreError;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// API error surface
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream unavailable")]
    Unavailable,

    #[error("Internal error")]
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Unavailable => "upstream_unavailable",
            ApiError::Internal => "internal_error",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::Validation(msg) => ApiError::Validation(msg),
            LedgerError::NotFound(msg) => ApiError::NotFound(msg),
            LedgerError::Conflict(msg) => ApiError::Conflict(msg),
            LedgerError::Store(store) => match store {
                StoreError::Unavailable(msg) => {
                    tracing::error!("store unavailable: {}", msg);
                    ApiError::Unavailable
                }
                StoreError::Query(e) => {
                    tracing::error!("store query failed: {}", e);
                    ApiError::Unavailable
                }
                other => {
                    tracing::error!("store error: {}", other);
                    ApiError::Internal
                }
            },
        }
    }
}
