//! Rating domain entity

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const MIN_RATE: i32 = 0;
pub const MAX_RATE: i32 = 5;

/// Whether `rate` is one of the accepted scores `0..=5`.
pub fn is_valid_rate(rate: i32) -> bool {
    (MIN_RATE..=MAX_RATE).contains(&rate)
}

/// A stored rating of a professional, written by a consumer.
///
/// Ratings are immutable once created; the only other operation on them
/// is deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rating {
    /// Generated by the repository at creation time.
    pub id: Uuid,
    pub professional_id: Uuid,
    pub consumer_id: Uuid,
    pub rate: i32,
    pub description: Option<String>,
    /// Assigned by the repository at creation time.
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields of a rating. The id and creation timestamp are
/// never part of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRating {
    pub professional_id: Uuid,
    pub consumer_id: Uuid,
    pub rate: i32,
    pub description: Option<String>,
}

impl NewRating {
    pub fn new(
        professional_id: Uuid,
        consumer_id: Uuid,
        rate: i32,
        description: Option<String>,
    ) -> Self {
        Self {
            professional_id,
            consumer_id,
            rate,
            description,
        }
    }

    /// Attach the generated identity and timestamp.
    pub fn into_rating(self, id: Uuid, created_at: DateTime<Utc>) -> Rating {
        Rating {
            id,
            professional_id: self.professional_id,
            consumer_id: self.consumer_id,
            rate: self.rate,
            description: self.description,
            created_at,
        }
    }
}
