//! In-memory rating repository
//!
//! Same ordering, pagination and constraint semantics as the MongoDB
//! repository. Used for local development (`database.backend = "memory"`)
//! and as the test double for the service and HTTP layers.

use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::domain::rating::{is_valid_rate, NewRating, Rating, RatingRepository, MAX_RATE, MIN_RATE};
use crate::shared::{MonotonicClock, Page, PageRequest, PersistenceError, PersistenceResult};

pub struct InMemoryRatingRepository {
    ratings: DashMap<Uuid, Rating>,
    clock: MonotonicClock,
    /// When set, every operation fails with this error.
    failure: Mutex<Option<PersistenceError>>,
}

impl InMemoryRatingRepository {
    pub fn new() -> Self {
        Self {
            ratings: DashMap::new(),
            clock: MonotonicClock::new(),
            failure: Mutex::new(None),
        }
    }

    /// Make every subsequent operation fail with `error`.
    pub fn fail_with(&self, error: PersistenceError) {
        *self.failure.lock().unwrap_or_else(|p| p.into_inner()) = Some(error);
    }

    pub fn clear_failure(&self) {
        *self.failure.lock().unwrap_or_else(|p| p.into_inner()) = None;
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    fn check_failure(&self) -> PersistenceResult<()> {
        match self.failure.lock().unwrap_or_else(|p| p.into_inner()).as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn list_matching(
        &self,
        page: PageRequest,
        matches: impl Fn(&Rating) -> bool,
    ) -> PersistenceResult<Page<Rating>> {
        self.check_failure()?;

        let mut matching: Vec<Rating> = self
            .ratings
            .iter()
            .filter(|entry| matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.size as usize)
            .collect();
        Ok(Page::new(items, total))
    }
}

impl Default for InMemoryRatingRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RatingRepository for InMemoryRatingRepository {
    async fn create(&self, rating: NewRating) -> PersistenceResult<Rating> {
        self.check_failure()?;

        // Mirrors the collection's $jsonSchema validator.
        if !is_valid_rate(rating.rate) {
            return Err(PersistenceError::Validation(format!(
                "Document failed validation: rate {} is outside [{}, {}]",
                rating.rate, MIN_RATE, MAX_RATE
            )));
        }

        let id = Uuid::new_v4();
        if self.ratings.contains_key(&id) {
            return Err(PersistenceError::Validation(format!(
                "Duplicate key error: _id {id}"
            )));
        }

        let stored = rating.into_rating(id, self.clock.now());
        self.ratings.insert(id, stored.clone());
        debug!(rating_id = %id, "Stored rating in memory");
        Ok(stored)
    }

    async fn get_by_id(&self, id: Uuid) -> PersistenceResult<Option<Rating>> {
        self.check_failure()?;
        Ok(self.ratings.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_by_professional(
        &self,
        professional_id: Uuid,
        page: PageRequest,
    ) -> PersistenceResult<Page<Rating>> {
        self.list_matching(page, |r| r.professional_id == professional_id)
    }

    async fn list_by_consumer(
        &self,
        consumer_id: Uuid,
        page: PageRequest,
    ) -> PersistenceResult<Page<Rating>> {
        self.list_matching(page, |r| r.consumer_id == consumer_id)
    }

    async fn delete(&self, id: Uuid) -> PersistenceResult<bool> {
        self.check_failure()?;
        Ok(self.ratings.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_rating(professional_id: Uuid, consumer_id: Uuid, rate: i32) -> NewRating {
        NewRating::new(professional_id, consumer_id, rate, None)
    }

    #[tokio::test]
    async fn create_assigns_id_and_timestamp() {
        let repo = InMemoryRatingRepository::new();
        let input = NewRating::new(Uuid::new_v4(), Uuid::new_v4(), 5, Some("Excellent!".into()));

        let created = repo.create(input.clone()).await.unwrap();

        assert_eq!(created.professional_id, input.professional_id);
        assert_eq!(created.description.as_deref(), Some("Excellent!"));
        assert_eq!(repo.get_by_id(created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn create_rejects_out_of_range_rate() {
        let repo = InMemoryRatingRepository::new();
        let err = repo
            .create(new_rating(Uuid::new_v4(), Uuid::new_v4(), 9))
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Validation(_)));
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let repo = InMemoryRatingRepository::new();
        assert_eq!(repo.get_by_id(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_windowed() {
        let repo = InMemoryRatingRepository::new();
        let professional = Uuid::new_v4();
        let mut created = Vec::new();
        for rate in [1, 2, 3, 4, 5] {
            created.push(repo.create(new_rating(professional, Uuid::new_v4(), rate)).await.unwrap());
        }
        repo.create(new_rating(Uuid::new_v4(), Uuid::new_v4(), 3)).await.unwrap();

        let first = repo
            .list_by_professional(professional, PageRequest::new(1, 2))
            .await
            .unwrap();
        assert_eq!(first.total, 5);
        let rates: Vec<i32> = first.items.iter().map(|r| r.rate).collect();
        assert_eq!(rates, vec![5, 4]);

        let last = repo
            .list_by_professional(professional, PageRequest::new(3, 2))
            .await
            .unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].id, created[0].id);

        let beyond = repo
            .list_by_professional(professional, PageRequest::new(4, 2))
            .await
            .unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 5);
    }

    #[tokio::test]
    async fn list_by_consumer_filters_on_consumer() {
        let repo = InMemoryRatingRepository::new();
        let consumer = Uuid::new_v4();
        repo.create(new_rating(Uuid::new_v4(), consumer, 2)).await.unwrap();
        repo.create(new_rating(Uuid::new_v4(), Uuid::new_v4(), 2)).await.unwrap();

        let page = repo
            .list_by_consumer(consumer, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert!(page.items.iter().all(|r| r.consumer_id == consumer));
    }

    #[tokio::test]
    async fn delete_reports_whether_removed() {
        let repo = InMemoryRatingRepository::new();
        let created = repo
            .create(new_rating(Uuid::new_v4(), Uuid::new_v4(), 3))
            .await
            .unwrap();

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn injected_failure_applies_until_cleared() {
        let repo = InMemoryRatingRepository::new();
        repo.fail_with(PersistenceError::Operation("connection reset".into()));
        assert!(repo.get_by_id(Uuid::new_v4()).await.is_err());

        repo.clear_failure();
        assert!(repo.get_by_id(Uuid::new_v4()).await.is_ok());
    }
}
