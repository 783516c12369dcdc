//! Rating DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{NewRating, Rating};
use crate::shared::{PageRequest, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRatingRequest {
    pub professional_id: Uuid,
    pub consumer_id: Uuid,
    /// Score from 0 to 5 inclusive
    #[validate(range(min = 0, max = 5, message = "rate must be between 0 and 5"))]
    #[schema(minimum = 0, maximum = 5, example = 5)]
    pub rate: i32,
    #[serde(default)]
    #[schema(example = "Excellent!")]
    pub description: Option<String>,
}

impl From<CreateRatingRequest> for NewRating {
    fn from(req: CreateRatingRequest) -> Self {
        NewRating::new(req.professional_id, req.consumer_id, req.rate, req.description)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RatingResponse {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub consumer_id: Uuid,
    pub rate: i32,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Rating> for RatingResponse {
    fn from(r: Rating) -> Self {
        Self {
            id: r.id,
            professional_id: r.professional_id,
            consumer_id: r.consumer_id,
            rate: r.rate,
            description: r.description,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListRatingsParams {
    /// Page number, starting at 1
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "page must be greater than or equal to 1"))]
    #[param(minimum = 1, default = 1)]
    pub page: u32,
    /// Records per page
    #[serde(default = "default_size")]
    #[validate(range(min = 1, max = 100, message = "size must be between 1 and 100"))]
    #[param(minimum = 1, maximum = 100, default = 10)]
    pub size: u32,
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}
fn default_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl ListRatingsParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.size)
    }
}
