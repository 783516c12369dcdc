//! Rating aggregate
//!
//! Contains the Rating entity and its repository interface.

pub mod model;
pub mod repository;

pub use model::{is_valid_rate, NewRating, Rating, MAX_RATE, MIN_RATE};
pub use repository::RatingRepository;
