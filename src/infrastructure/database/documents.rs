//! Stored document layout of the `ratings` collection
//!
//! Identifiers are stored in their canonical hyphenated text form and
//! `created_at` as a native BSON date.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Rating;
use crate::shared::PersistenceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub professional_id: String,
    pub consumer_id: String,
    pub rate: i32,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: bson::DateTime,
}

impl From<&Rating> for RatingDocument {
    fn from(rating: &Rating) -> Self {
        Self {
            id: rating.id.to_string(),
            professional_id: rating.professional_id.to_string(),
            consumer_id: rating.consumer_id.to_string(),
            rate: rating.rate,
            description: rating.description.clone(),
            created_at: bson::DateTime::from_chrono(rating.created_at),
        }
    }
}

impl TryFrom<RatingDocument> for Rating {
    type Error = PersistenceError;

    fn try_from(doc: RatingDocument) -> Result<Self, Self::Error> {
        Ok(Rating {
            id: parse_uuid("_id", &doc.id)?,
            professional_id: parse_uuid("professional_id", &doc.professional_id)?,
            consumer_id: parse_uuid("consumer_id", &doc.consumer_id)?,
            rate: doc.rate,
            description: doc.description,
            created_at: doc.created_at.to_chrono(),
        })
    }
}

fn parse_uuid(field: &str, value: &str) -> Result<Uuid, PersistenceError> {
    Uuid::parse_str(value).map_err(|e| {
        PersistenceError::Unexpected(format!("Stored {field} '{value}' is not a UUID: {e}"))
    })
}
