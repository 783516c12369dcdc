//! Error-response mapper
//!
//! Every failure reaching the HTTP boundary is an [`AppError`] and
//! resolves to exactly one response shape, in this order:
//!
//! 1. domain error: its own status, message and details
//! 2. request-shape error: 422 with one entry per offending field
//! 3. persistence error the service let through: 500 with the raw text
//! 4. anything else (including panics): 500 generic; raw text only in
//!    debug mode

use std::any::Any;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{error, warn};

use super::dto::{ErrorResponse, ValidationErrorResponse};
use crate::shared::{error_details, AppError};

pub const INVALID_REQUEST_MESSAGE: &str = "Invalid request data";
pub const DATABASE_ERROR_MESSAGE: &str = "An error occurred while accessing the database";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Raw text of an unexpected error, attached to the generic 500 response
/// so the debug middleware can expose it.
#[derive(Debug, Clone)]
pub struct UnexpectedErrorDetail(pub String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Domain(err) => {
                let status = err.status_code();
                if status.is_server_error() {
                    error!(code = err.error_code(), details = ?err.details(), "{}", err.message());
                } else {
                    warn!(code = err.error_code(), details = ?err.details(), "{}", err.message());
                }
                let body = ErrorResponse {
                    message: err.message().to_string(),
                    details: err.details().cloned(),
                };
                (status, Json(body)).into_response()
            }
            AppError::Request(err) => {
                warn!(fields = err.errors.len(), "Rejected malformed request");
                let body = ValidationErrorResponse {
                    message: INVALID_REQUEST_MESSAGE.to_string(),
                    detail: err.errors.into_iter().map(Into::into).collect(),
                };
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
            AppError::Persistence(err) => {
                error!(error = %err, "Unhandled persistence error");
                let body = ErrorResponse {
                    message: DATABASE_ERROR_MESSAGE.to_string(),
                    details: Some(error_details(&err)),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            AppError::Unexpected(detail) => {
                error!(error = %detail, "Unexpected error");
                let body = ErrorResponse {
                    message: UNEXPECTED_ERROR_MESSAGE.to_string(),
                    details: None,
                };
                let mut response = (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
                response
                    .extensions_mut()
                    .insert(UnexpectedErrorDetail(detail));
                response
            }
        }
    }
}

/// Turn a handler panic into the generic 500 response.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "handler panicked".to_string()
    };
    AppError::Unexpected(detail).into_response()
}

/// Debug-mode only: put the raw text of unexpected errors into `details`.
pub async fn expose_error_details(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    match response.extensions_mut().remove::<UnexpectedErrorDetail>() {
        Some(UnexpectedErrorDetail(detail)) => {
            let body = ErrorResponse {
                message: UNEXPECTED_ERROR_MESSAGE.to_string(),
                details: Some(error_details(&detail)),
            };
            (response.status(), Json(body)).into_response()
        }
        None => response,
    }
}

/// Install panic recovery, and the detail-exposing middleware when
/// `debug` is on.
pub fn with_error_handling(router: Router, debug: bool) -> Router {
    let router = router.layer(CatchPanicLayer::custom(panic_response));
    if debug {
        router.layer(middleware::from_fn(expose_error_details))
    } else {
        router
    }
}
