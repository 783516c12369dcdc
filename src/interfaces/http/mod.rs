//! HTTP REST API interfaces
//!
//! - `common`: envelopes, extractors and the error-response mapper
//! - `modules`: handlers per resource
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDoc};
