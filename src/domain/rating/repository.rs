//! Rating repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{NewRating, Rating};
use crate::shared::{Page, PageRequest, PersistenceResult};

/// Persistence port for ratings.
///
/// Implementations own the physical storage layout and classify store
/// failures into [`PersistenceError`](crate::shared::PersistenceError).
/// Absence is never an error: lookups return `None` and deletes return
/// `false`.
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Persist a rating, assigning a fresh id and creation timestamp.
    async fn create(&self, rating: NewRating) -> PersistenceResult<Rating>;

    async fn get_by_id(&self, id: Uuid) -> PersistenceResult<Option<Rating>>;

    /// Ratings of one professional, most recent first.
    async fn list_by_professional(
        &self,
        professional_id: Uuid,
        page: PageRequest,
    ) -> PersistenceResult<Page<Rating>>;

    /// Ratings written by one consumer, most recent first.
    async fn list_by_consumer(
        &self,
        consumer_id: Uuid,
        page: PageRequest,
    ) -> PersistenceResult<Page<Rating>>;

    /// Returns whether a record was actually removed.
    async fn delete(&self, id: Uuid) -> PersistenceResult<bool>;
}
