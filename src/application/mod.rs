//! Application layer - use-case orchestration

pub mod services;

pub use services::RatingService;
