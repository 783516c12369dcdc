//! Liveness check

pub mod handlers;

pub use handlers::*;
