//! Rating API handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use super::dto::{CreateRatingRequest, ListRatingsParams, RatingResponse};
use crate::application::RatingService;
use crate::interfaces::http::common::{
    ErrorResponse, PaginatedResponse, UuidPath, ValidatedJson, ValidatedQuery,
    ValidationErrorResponse,
};
use crate::shared::AppResult;

/// Rating handler state
#[derive(Clone)]
pub struct RatingState {
    pub service: Arc<RatingService>,
}

#[utoipa::path(
    post,
    path = "/ratings/",
    tag = "Ratings",
    request_body = CreateRatingRequest,
    responses(
        (status = 201, description = "Rating created", body = RatingResponse),
        (status = 400, description = "Rating rejected", body = ErrorResponse),
        (status = 422, description = "Malformed request", body = ValidationErrorResponse)
    )
)]
pub async fn create_rating(
    State(state): State<RatingState>,
    ValidatedJson(body): ValidatedJson<CreateRatingRequest>,
) -> AppResult<(StatusCode, Json<RatingResponse>)> {
    let rating = state.service.create_rating(body.into()).await?;
    Ok((StatusCode::CREATED, Json(rating.into())))
}

#[utoipa::path(
    get,
    path = "/ratings/{rating_id}",
    tag = "Ratings",
    params(("rating_id" = Uuid, Path, description = "Rating ID")),
    responses(
        (status = 200, description = "Rating", body = RatingResponse),
        (status = 404, description = "Rating not found", body = ErrorResponse),
        (status = 422, description = "Malformed id", body = ValidationErrorResponse)
    )
)]
pub async fn get_rating(
    State(state): State<RatingState>,
    UuidPath(rating_id): UuidPath,
) -> AppResult<Json<RatingResponse>> {
    let rating = state.service.get_rating_by_id(rating_id).await?;
    Ok(Json(rating.into()))
}

#[utoipa::path(
    get,
    path = "/ratings/professional/{professional_id}",
    tag = "Ratings",
    params(
        ("professional_id" = Uuid, Path, description = "Professional ID"),
        ListRatingsParams
    ),
    responses(
        (status = 200, description = "Ratings received by the professional, newest first", body = PaginatedResponse<RatingResponse>),
        (status = 422, description = "Invalid id or pagination", body = ValidationErrorResponse),
        (status = 500, description = "Listing failed", body = ErrorResponse)
    )
)]
pub async fn list_ratings_by_professional(
    State(state): State<RatingState>,
    UuidPath(professional_id): UuidPath,
    ValidatedQuery(params): ValidatedQuery<ListRatingsParams>,
) -> AppResult<Json<PaginatedResponse<RatingResponse>>> {
    let result = state
        .service
        .list_ratings_by_professional(professional_id, params.page_request())
        .await?;
    Ok(Json(result.into()))
}

#[utoipa::path(
    get,
    path = "/ratings/consumer/{consumer_id}",
    tag = "Ratings",
    params(
        ("consumer_id" = Uuid, Path, description = "Consumer ID"),
        ListRatingsParams
    ),
    responses(
        (status = 200, description = "Ratings written by the consumer, newest first", body = PaginatedResponse<RatingResponse>),
        (status = 422, description = "Invalid id or pagination", body = ValidationErrorResponse),
        (status = 500, description = "Listing failed", body = ErrorResponse)
    )
)]
pub async fn list_ratings_by_consumer(
    State(state): State<RatingState>,
    UuidPath(consumer_id): UuidPath,
    ValidatedQuery(params): ValidatedQuery<ListRatingsParams>,
) -> AppResult<Json<PaginatedResponse<RatingResponse>>> {
    let result = state
        .service
        .list_ratings_by_consumer(consumer_id, params.page_request())
        .await?;
    Ok(Json(result.into()))
}

#[utoipa::path(
    delete,
    path = "/ratings/{rating_id}",
    tag = "Ratings",
    params(("rating_id" = Uuid, Path, description = "Rating ID")),
    responses(
        (status = 204, description = "Rating deleted"),
        (status = 404, description = "Rating not found", body = ErrorResponse),
        (status = 422, description = "Malformed id", body = ValidationErrorResponse)
    )
)]
pub async fn delete_rating(
    State(state): State<RatingState>,
    UuidPath(rating_id): UuidPath,
) -> AppResult<StatusCode> {
    state.service.delete_rating(rating_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
