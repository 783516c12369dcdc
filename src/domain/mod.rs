pub mod rating;

pub use rating::{NewRating, Rating, RatingRepository};

pub use crate::shared::{DomainError, PersistenceError};
