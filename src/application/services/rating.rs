//! Rating service, the application-layer orchestration
//!
//! HTTP handlers are thin wrappers that delegate here. This is the only
//! place where repository failures are translated into domain errors, and
//! the translation differs per operation:
//!
//! | operation | absent record   | repository failure                  |
//! |-----------|-----------------|-------------------------------------|
//! | create    | n/a             | `Validation` ("Failed to create")   |
//! | get       | `NotFound`      | `Database` ("Failed to fetch")      |
//! | list      | empty page      | `Database` ("Failed to list")       |
//! | delete    | `NotFound`      | `Database` ("Failed to delete")     |

use std::sync::Arc;

use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{NewRating, Rating, RatingRepository};
use crate::shared::{
    error_details, AppResult, DomainError, Page, PageRequest, PaginatedResult, PersistenceResult,
};

pub struct RatingService {
    repo: Arc<dyn RatingRepository>,
}

impl RatingService {
    pub fn new(repo: Arc<dyn RatingRepository>) -> Self {
        Self { repo }
    }

    /// Persist a new rating.
    ///
    /// Input is assumed to be shape-checked already. Any repository
    /// failure, operational ones included, is reported as a validation
    /// error carrying the original text.
    pub async fn create_rating(&self, input: NewRating) -> AppResult<Rating> {
        info!(professional_id = %input.professional_id, "Creating rating");
        match self.repo.create(input).await {
            Ok(rating) => {
                info!(rating_id = %rating.id, "Rating created");
                Ok(rating)
            }
            Err(e) => {
                error!(error = %e, "Error creating rating");
                Err(DomainError::validation("Failed to create rating", Some(error_details(&e))).into())
            }
        }
    }

    pub async fn get_rating_by_id(&self, id: Uuid) -> AppResult<Rating> {
        info!(rating_id = %id, "Fetching rating");
        match self.repo.get_by_id(id).await {
            Ok(Some(rating)) => Ok(rating),
            Ok(None) => {
                warn!(rating_id = %id, "Rating not found");
                Err(not_found(id).into())
            }
            Err(e) => {
                error!(rating_id = %id, error = %e, "Error fetching rating");
                Err(DomainError::database("Failed to fetch rating", Some(error_details(&e))).into())
            }
        }
    }

    pub async fn list_ratings_by_professional(
        &self,
        professional_id: Uuid,
        page: PageRequest,
    ) -> AppResult<PaginatedResult<Rating>> {
        info!(%professional_id, page = page.page, size = page.size, "Listing ratings for professional");
        let result = self.repo.list_by_professional(professional_id, page).await;
        paginate(result, page)
    }

    pub async fn list_ratings_by_consumer(
        &self,
        consumer_id: Uuid,
        page: PageRequest,
    ) -> AppResult<PaginatedResult<Rating>> {
        info!(%consumer_id, page = page.page, size = page.size, "Listing ratings by consumer");
        let result = self.repo.list_by_consumer(consumer_id, page).await;
        paginate(result, page)
    }

    /// Delete a rating. Deleting an id that does not exist (including a
    /// second delete of the same id) is `NotFound`.
    pub async fn delete_rating(&self, id: Uuid) -> AppResult<()> {
        info!(rating_id = %id, "Deleting rating");
        match self.repo.delete(id).await {
            Ok(true) => {
                info!(rating_id = %id, "Rating deleted");
                Ok(())
            }
            Ok(false) => {
                warn!(rating_id = %id, "Rating not found");
                Err(not_found(id).into())
            }
            Err(e) => {
                error!(rating_id = %id, error = %e, "Error deleting rating");
                Err(DomainError::database("Failed to delete rating", Some(error_details(&e))).into())
            }
        }
    }
}

fn not_found(id: Uuid) -> DomainError {
    DomainError::not_found("Rating not found", Some(json!({ "rating_id": id.to_string() })))
}

fn paginate(
    result: PersistenceResult<Page<Rating>>,
    request: PageRequest,
) -> AppResult<PaginatedResult<Rating>> {
    match result {
        Ok(page) => {
            let result = PaginatedResult::new(page, request);
            info!(found = result.items.len(), total = result.total, "Ratings listed");
            Ok(result)
        }
        Err(e) => {
            error!(error = %e, "Error listing ratings");
            Err(DomainError::database("Failed to list ratings", Some(error_details(&e))).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::InMemoryRatingRepository;
    use crate::shared::{AppError, PersistenceError};

    fn service() -> (Arc<InMemoryRatingRepository>, RatingService) {
        let repo = Arc::new(InMemoryRatingRepository::new());
        (repo.clone(), RatingService::new(repo))
    }

    fn input(professional_id: Uuid, consumer_id: Uuid, rate: i32) -> NewRating {
        NewRating::new(professional_id, consumer_id, rate, Some("Excellent!".into()))
    }

    fn domain(err: AppError) -> DomainError {
        match err {
            AppError::Domain(e) => e,
            other => panic!("expected domain error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn created_rating_can_be_fetched() {
        let (_, service) = service();
        let created = service
            .create_rating(input(Uuid::new_v4(), Uuid::new_v4(), 5))
            .await
            .unwrap();
        let fetched = service.get_rating_by_id(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn store_rejection_on_create_is_validation_error() {
        let (_, service) = service();
        let err = domain(
            service
                .create_rating(input(Uuid::new_v4(), Uuid::new_v4(), 9))
                .await
                .unwrap_err(),
        );
        assert!(matches!(err, DomainError::Validation { .. }));
        assert_eq!(err.message(), "Failed to create rating");
        let detail = err.details().and_then(|d| d["error"].as_str()).unwrap();
        assert!(detail.contains("Persistence validation error"));
    }

    #[tokio::test]
    async fn operational_failure_on_create_is_also_validation_error() {
        let (repo, service) = service();
        repo.fail_with(PersistenceError::Operation("no reachable servers".into()));

        let err = domain(
            service
                .create_rating(input(Uuid::new_v4(), Uuid::new_v4(), 3))
                .await
                .unwrap_err(),
        );
        assert!(matches!(err, DomainError::Validation { .. }));
        assert_eq!(
            err.details(),
            Some(&json!({ "error": "Persistence operation error: no reachable servers" }))
        );
    }

    #[tokio::test]
    async fn missing_rating_is_not_found_with_id() {
        let (_, service) = service();
        let id = Uuid::new_v4();
        let err = domain(service.get_rating_by_id(id).await.unwrap_err());
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert_eq!(err.details(), Some(&json!({ "rating_id": id.to_string() })));
    }

    #[tokio::test]
    async fn get_failure_is_database_error() {
        let (repo, service) = service();
        repo.fail_with(PersistenceError::Operation("timeout".into()));
        let err = domain(service.get_rating_by_id(Uuid::new_v4()).await.unwrap_err());
        assert!(matches!(err, DomainError::Database { .. }));
        assert_eq!(err.message(), "Failed to fetch rating");
        assert_eq!(
            err.details(),
            Some(&json!({ "error": "Persistence operation error: timeout" }))
        );
    }

    #[tokio::test]
    async fn list_computes_page_count() {
        let (_, service) = service();
        let professional = Uuid::new_v4();
        for _ in 0..15 {
            service
                .create_rating(input(professional, Uuid::new_v4(), 4))
                .await
                .unwrap();
        }

        let first = service
            .list_ratings_by_professional(professional, PageRequest::new(1, 10))
            .await
            .unwrap();
        let second = service
            .list_ratings_by_professional(professional, PageRequest::new(2, 10))
            .await
            .unwrap();

        assert_eq!((first.items.len(), first.total, first.pages), (10, 15, 2));
        assert_eq!((second.items.len(), second.total, second.pages), (5, 15, 2));
    }

    #[tokio::test]
    async fn empty_list_has_zero_pages() {
        let (_, service) = service();
        let result = service
            .list_ratings_by_consumer(Uuid::new_v4(), PageRequest::default())
            .await
            .unwrap();
        assert!(result.items.is_empty());
        assert_eq!((result.total, result.pages), (0, 0));
    }

    #[tokio::test]
    async fn list_failure_is_database_error() {
        let (repo, service) = service();
        repo.fail_with(PersistenceError::Unexpected("cursor killed".into()));
        let err = domain(
            service
                .list_ratings_by_consumer(Uuid::new_v4(), PageRequest::default())
                .await
                .unwrap_err(),
        );
        assert!(matches!(err, DomainError::Database { .. }));
        assert_eq!(err.message(), "Failed to list ratings");
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let (_, service) = service();
        let created = service
            .create_rating(input(Uuid::new_v4(), Uuid::new_v4(), 1))
            .await
            .unwrap();

        service.delete_rating(created.id).await.unwrap();
        let err = domain(service.delete_rating(created.id).await.unwrap_err());
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_failure_is_database_error() {
        let (repo, service) = service();
        repo.fail_with(PersistenceError::Operation("primary stepped down".into()));
        let err = domain(service.delete_rating(Uuid::new_v4()).await.unwrap_err());
        assert!(matches!(err, DomainError::Database { .. }));
        assert_eq!(err.message(), "Failed to delete rating");
    }
}
