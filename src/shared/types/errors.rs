use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Storage-level failure, classified by the repository that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// The store's own schema or constraint validation rejected the document.
    #[error("Persistence validation error: {0}")]
    Validation(String),

    /// Connectivity loss, timeout or an internal store fault.
    #[error("Persistence operation error: {0}")]
    Operation(String),

    #[error("Persistence error: {0}")]
    Unexpected(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Domain-level failure with a fixed HTTP status.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("{message}")]
    NotFound {
        message: String,
        details: Option<Value>,
    },

    #[error("{message}")]
    Validation {
        message: String,
        details: Option<Value>,
    },

    #[error("{message}")]
    Database {
        message: String,
        details: Option<Value>,
    },

    /// Reserved: no endpoint authenticates callers yet.
    #[error("{message}")]
    Authentication {
        message: String,
        details: Option<Value>,
    },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>, details: Option<Value>) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn validation(message: impl Into<String>, details: Option<Value>) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn database(message: impl Into<String>, details: Option<Value>) -> Self {
        Self::Database {
            message: message.into(),
            details,
        }
    }

    pub fn authentication(message: impl Into<String>, details: Option<Value>) -> Self {
        Self::Authentication {
            message: message.into(),
            details,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Authentication { .. } => StatusCode::UNAUTHORIZED,
        }
    }

    /// Stable machine-readable code, used in logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Database { .. } => "DATABASE_ERROR",
            Self::Authentication { .. } => "AUTHENTICATION_ERROR",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::NotFound { message, .. }
            | Self::Validation { message, .. }
            | Self::Database { message, .. }
            | Self::Authentication { message, .. } => message,
        }
    }

    pub fn details(&self) -> Option<&Value> {
        match self {
            Self::NotFound { details, .. }
            | Self::Validation { details, .. }
            | Self::Database { details, .. }
            | Self::Authentication { details, .. } => details.as_ref(),
        }
    }
}

/// `{"error": "<text>"}` details object carrying an underlying error's text.
pub fn error_details(err: &impl std::fmt::Display) -> Value {
    json!({ "error": err.to_string() })
}

/// One offending request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Where the problem is, e.g. `["body", "rate"]` or `["path", "id"]`.
    pub location: Vec<String>,
    pub message: String,
}

impl FieldError {
    pub fn new<I, S>(location: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            location: location.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }
}

/// Request-shape failure detected before the service is called.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid request data")]
pub struct RequestError {
    pub errors: Vec<FieldError>,
}

impl RequestError {
    pub fn single(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

/// Any failure that can reach the HTTP boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_have_fixed_status_codes() {
        assert_eq!(
            DomainError::not_found("x", None).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            DomainError::validation("x", None).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DomainError::database("x", None).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            DomainError::authentication("x", None).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn message_and_details_are_exposed() {
        let err = DomainError::not_found(
            "Rating not found",
            Some(json!({ "rating_id": "abc" })),
        );
        assert_eq!(err.message(), "Rating not found");
        assert_eq!(err.details(), Some(&json!({ "rating_id": "abc" })));
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert_eq!(err.to_string(), "Rating not found");
    }

    #[test]
    fn error_details_wraps_display_text() {
        let err = PersistenceError::Operation("connection refused".into());
        assert_eq!(
            error_details(&err),
            json!({ "error": "Persistence operation error: connection refused" })
        );
    }

    #[test]
    fn persistence_error_converts_into_app_error() {
        let err: AppError = PersistenceError::Unexpected("boom".into()).into();
        assert!(matches!(err, AppError::Persistence(PersistenceError::Unexpected(_))));
    }

    #[test]
    fn field_error_builds_location_path() {
        let err = FieldError::new(["body", "rate"], "out of range");
        assert_eq!(err.location, vec!["body".to_string(), "rate".to_string()]);
    }
}
