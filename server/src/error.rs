//! HTTP error envelope shared by every route.
//!
//! DESIGN
//! ======
//! Every failure leaves the server as
//! `{"error": {"code": "SOME_CODE", "message": "..."}}` with a matching
//! status. Services define their own `thiserror` enums with stable
//! [`ErrorCode`]s; each route module owns a `*_error_to_api` mapper that picks
//! the status for its service. Extractor rejections (bad JSON, bad path ids,
//! bad query strings) go through the `Api*` wrappers below so they use the
//! same envelope instead of axum's plain-text bodies.
//!
//! ERROR HANDLING
//! ==============
//! Database and internal failures are logged here with `tracing::error!` and
//! reach the client only as a generic message.

use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Stable machine-readable code carried by every service error.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;
}

const INTERNAL_MESSAGE: &str = "an unexpected error occurred";

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into() }
    }

    /// Wrap a service error, keeping its code and display text.
    #[must_use]
    pub fn from_service<E: ErrorCode>(status: StatusCode, err: &E) -> Self {
        Self::new(status, err.error_code(), err.to_string())
    }

    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "authentication required")
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    #[must_use]
    pub fn not_found(entity: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", format!("{entity} not found"))
    }

    /// Log `err` and return a generic 500.
    #[must_use]
    pub fn internal(err: &dyn std::fmt::Display) -> Self {
        tracing::error!(error = %err, "internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", INTERNAL_MESSAGE)
    }

    /// Classify a sqlx error. Unique violations on `uq_*` constraints become
    /// 409; everything else is logged and hidden behind a 500.
    #[must_use]
    pub fn database(err: &sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = err {
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return Self::new(StatusCode::CONFLICT, "CONFLICT", format!("duplicate value for {constraint}"));
                }
            }
        }
        tracing::error!(error = %err, "database error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", INTERNAL_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "error": { "code": self.code, "message": self.message } });
        (self.status, axum::Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(format!("invalid path parameter: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(format!("invalid query string: {}", rejection.body_text()))
    }
}

/// `axum::Json` with JSON error bodies on rejection.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Path` with JSON error bodies on rejection.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// `axum::extract::Query` with JSON error bodies on rejection.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
