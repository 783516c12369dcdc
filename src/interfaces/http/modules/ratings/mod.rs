//! Ratings module: create, fetch, list and delete

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
