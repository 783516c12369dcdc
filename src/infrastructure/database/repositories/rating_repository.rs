//! MongoDB implementation of RatingRepository

use std::future::{Future, IntoFuture};
use std::time::Duration;

use async_trait::async_trait;
use bson::{doc, Document};
use futures_util::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::Collection;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::domain::{NewRating, Rating, RatingRepository};
use crate::infrastructure::database::documents::RatingDocument;
use crate::shared::{MonotonicClock, Page, PageRequest, PersistenceError, PersistenceResult};

pub struct MongoRatingRepository {
    collection: Collection<RatingDocument>,
    clock: MonotonicClock,
    operation_timeout: Duration,
}

impl MongoRatingRepository {
    pub fn new(collection: Collection<RatingDocument>, operation_timeout: Duration) -> Self {
        Self {
            collection,
            clock: MonotonicClock::new(),
            operation_timeout,
        }
    }

    /// Run one store round-trip under the per-operation timeout and
    /// classify whatever goes wrong.
    async fn run<T, F>(&self, operation: &'static str, fut: F) -> PersistenceResult<T>
    where
        F: Future<Output = mongodb::error::Result<T>>,
    {
        match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                let classified = classify(&e);
                error!(operation, error = %e, "MongoDB operation failed");
                Err(classified)
            }
            Err(_) => {
                error!(
                    operation,
                    timeout_ms = self.operation_timeout.as_millis() as u64,
                    "MongoDB operation timed out"
                );
                Err(PersistenceError::Operation(format!(
                    "{operation} timed out after {}ms",
                    self.operation_timeout.as_millis()
                )))
            }
        }
    }

    async fn list_where(
        &self,
        filter: Document,
        page: PageRequest,
    ) -> PersistenceResult<Page<Rating>> {
        let total = self
            .run("count_ratings", self.collection.count_documents(filter.clone()).into_future())
            .await?;
        if total == 0 {
            return Ok(Page::empty());
        }

        let documents: Vec<RatingDocument> = self
            .run("list_ratings", async {
                let cursor = self
                    .collection
                    .find(filter)
                    .sort(doc! { "created_at": -1 })
                    .skip(page.offset())
                    .limit(i64::from(page.size))
                    .await?;
                cursor.try_collect::<Vec<RatingDocument>>().await
            })
            .await?;

        let items = documents
            .into_iter()
            .map(Rating::try_from)
            .collect::<PersistenceResult<Vec<_>>>()?;
        Ok(Page::new(items, total))
    }
}

/// Map a driver error onto the persistence taxonomy.
///
/// Write errors come from the server rejecting the document itself
/// (schema validation, duplicate key). Transport and command failures are
/// operational. Everything else is unexpected.
pub fn classify(err: &mongodb::error::Error) -> PersistenceError {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(_)) => {
            PersistenceError::Validation(err.to_string())
        }
        ErrorKind::Write(_)
        | ErrorKind::Command(_)
        | ErrorKind::Io(_)
        | ErrorKind::ServerSelection { .. }
        | ErrorKind::ConnectionPoolCleared { .. }
        | ErrorKind::DnsResolve { .. }
        | ErrorKind::Authentication { .. } => PersistenceError::Operation(err.to_string()),
        _ => PersistenceError::Unexpected(err.to_string()),
    }
}

#[async_trait]
impl RatingRepository for MongoRatingRepository {
    async fn create(&self, rating: NewRating) -> PersistenceResult<Rating> {
        let stored = rating.into_rating(Uuid::new_v4(), self.clock.now());
        let document = RatingDocument::from(&stored);
        debug!(rating_id = %stored.id, "Inserting rating document");

        self.run("insert_rating", self.collection.insert_one(&document).into_future())
            .await?;

        info!(rating_id = %stored.id, "Rating document inserted");
        Ok(stored)
    }

    async fn get_by_id(&self, id: Uuid) -> PersistenceResult<Option<Rating>> {
        let found = self
            .run(
                "find_rating",
                self.collection.find_one(doc! { "_id": id.to_string() }).into_future(),
            )
            .await?;
        found.map(Rating::try_from).transpose()
    }

    async fn list_by_professional(
        &self,
        professional_id: Uuid,
        page: PageRequest,
    ) -> PersistenceResult<Page<Rating>> {
        self.list_where(doc! { "professional_id": professional_id.to_string() }, page)
            .await
    }

    async fn list_by_consumer(
        &self,
        consumer_id: Uuid,
        page: PageRequest,
    ) -> PersistenceResult<Page<Rating>> {
        self.list_where(doc! { "consumer_id": consumer_id.to_string() }, page)
            .await
    }

    async fn delete(&self, id: Uuid) -> PersistenceResult<bool> {
        let result = self
            .run(
                "delete_rating",
                self.collection.delete_one(doc! { "_id": id.to_string() }).into_future(),
            )
            .await?;
        Ok(result.deleted_count > 0)
    }
}
