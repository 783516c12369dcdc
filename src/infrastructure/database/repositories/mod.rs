//! Database repository implementations

pub mod rating_repository;

pub use rating_repository::MongoRatingRepository;
