//! Pieces shared by every HTTP module: envelopes, extractors, error mapping

pub mod dto;
pub mod error_response;
pub mod extractors;
pub mod validated_json;

pub use dto::*;
pub use error_response::{with_error_handling, UnexpectedErrorDetail};
pub use extractors::{UuidPath, ValidatedQuery};
pub use validated_json::ValidatedJson;
