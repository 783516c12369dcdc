//! # Rating Service
//!
//! HTTP microservice that stores ratings consumers give to professionals.
//!
//! ## Architecture
//!
//! - **domain**: the rating entity and the repository contract
//! - **application**: the rating service, which maps storage failures to
//!   domain errors
//! - **infrastructure**: MongoDB and in-memory repositories
//! - **interfaces**: REST API with Swagger documentation and the
//!   error-response mapper
//! - **shared**: error taxonomy, pagination, clock, shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, DatabaseConfig, InMemoryRatingRepository, MongoRatingRepository};

pub use application::RatingService;
pub use interfaces::create_api_router;
