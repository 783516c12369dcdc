//! Response envelopes shared by all endpoints

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::shared::{FieldError, PaginatedResult};

/// Error body for every non-422 failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    /// Structured context, e.g. `{"rating_id": "..."}` or `{"error": "..."}`.
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

/// One offending request field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FieldErrorResponse {
    /// Path to the field, e.g. `["body", "rate"]`.
    pub location: Vec<String>,
    pub message: String,
}

impl From<FieldError> for FieldErrorResponse {
    fn from(err: FieldError) -> Self {
        Self {
            location: err.location,
            message: err.message,
        }
    }
}

/// Error body for 422 responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub message: String,
    pub detail: Vec<FieldErrorResponse>,
}

/// One page of results.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    /// Records on this page
    pub items: Vec<T>,
    /// Matching records across all pages
    pub total: u64,
    /// Current page (1-based)
    pub page: u32,
    /// Page size
    pub size: u32,
    /// `ceil(total / size)`
    pub pages: u64,
}

impl<T, U> From<PaginatedResult<U>> for PaginatedResponse<T>
where
    T: From<U>,
{
    fn from(result: PaginatedResult<U>) -> Self {
        let result = result.map(T::from);
        Self {
            items: result.items,
            total: result.total,
            page: result.page,
            size: result.size,
            pages: result.pages,
        }
    }
}
