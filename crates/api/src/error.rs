//! API error types with HTTP response mapping.
//!
//! Two boundary shapes coexist, matching the two route families: checkout
//! endpoints answer `{success: false, code, message}`, CRUD endpoints answer
//! `{error: message}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog::CatalogError;
use checkout::CheckoutError;
use gateway::{GATEWAY_ERROR_CODE, GatewayError};

/// Boundary error for the checkout endpoints.
///
/// Carries the status code and classification tag emitted in the
/// `{success: false, code, message}` envelope.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    /// A 400 for missing or invalid request fields.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "VALIDATION_ERROR",
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = self.code, error = %self.message, "request failed");
        }
        let body = serde_json::json!({
            "success": false,
            "code": self.code,
            "message": self.message,
        });
        (self.status, axum::Json(body)).into_response()
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        let (status, code) = match &err {
            CheckoutError::TransactionNotFound(_) => {
                (StatusCode::NOT_FOUND, "TRANSACTION_NOT_FOUND")
            }
            CheckoutError::InsufficientStock { .. } => (StatusCode::CONFLICT, "INSUFFICIENT_STOCK"),
            CheckoutError::StockUpdateConflict { .. } => {
                (StatusCode::CONFLICT, "STOCK_UPDATE_FAILED")
            }
            CheckoutError::Gateway(e) => (
                StatusCode::from_u16(e.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                e.code,
            ),
            CheckoutError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
            CheckoutError::Serialization(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };
        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self {
            status: StatusCode::from_u16(err.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            code: GATEWAY_ERROR_CODE,
            message: err.message,
        }
    }
}

/// Boundary error for the CRUD endpoints: `{error: message}`.
#[derive(Debug)]
pub struct CrudError {
    pub status: StatusCode,
    pub message: String,
}

impl CrudError {
    /// A 400 for missing or invalid request fields.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for CrudError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(error = %self.message, "request failed");
        }
        let body = serde_json::json!({ "error": self.message });
        (self.status, axum::Json(body)).into_response()
    }
}

impl From<CatalogError> for CrudError {
    fn from(err: CatalogError) -> Self {
        let status = match &err {
            CatalogError::Validation(_) | CatalogError::InvalidStatus(_) => {
                StatusCode::BAD_REQUEST
            }
            CatalogError::ProductNotFound(_) | CatalogError::OrderNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            CatalogError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match &err {
            // Don't leak backend details on CRUD 500s.
            CatalogError::Store(_) => "Internal server error".to_string(),
            _ => err.to_string(),
        };
        Self { status, message }
    }
}
