//! Infrastructure layer - external concerns

pub mod database;
pub mod storage;

pub use database::{
    ensure_ratings_collection, init_database, DatabaseConfig, MongoRatingRepository,
};
pub use storage::InMemoryRatingRepository;
