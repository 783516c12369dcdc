//! API Router with Swagger UI and ReDoc

use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::RatingService;
use crate::interfaces::http::common::{
    with_error_handling, ErrorResponse, FieldErrorResponse, PaginatedResponse,
    ValidationErrorResponse,
};
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::interfaces::http::modules::{health, ratings};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        ratings::create_rating,
        ratings::get_rating,
        ratings::list_ratings_by_professional,
        ratings::list_ratings_by_consumer,
        ratings::delete_rating,
    ),
    components(
        schemas(
            ErrorResponse,
            FieldErrorResponse,
            ValidationErrorResponse,
            PaginatedResponse<ratings::RatingResponse>,
            health::HealthResponse,
            ratings::CreateRatingRequest,
            ratings::RatingResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness check"),
        (name = "Ratings", description = "Ratings that consumers give to professionals"),
    ),
    info(
        title = "Rating Service API",
        version = "1.0.0",
        description = "Create, fetch, list and delete professional ratings",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(service: Arc<RatingService>, debug: bool) -> Router {
    let rating_state = ratings::RatingState { service };

    let rating_routes = Router::new()
        .route("/ratings", post(ratings::create_rating))
        .route("/ratings/", post(ratings::create_rating))
        .route(
            "/ratings/{rating_id}",
            get(ratings::get_rating).delete(ratings::delete_rating),
        )
        .route(
            "/ratings/professional/{professional_id}",
            get(ratings::list_ratings_by_professional),
        )
        .route(
            "/ratings/consumer/{consumer_id}",
            get(ratings::list_ratings_by_consumer),
        )
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(rating_state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes =
        SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi());

    let router = Router::new()
        .merge(swagger_routes)
        .merge(Redoc::with_url("/redoc", ApiDoc::openapi()))
        .route("/health", get(health::health_check))
        .route("/health/", get(health::health_check))
        .method_not_allowed_fallback(method_not_allowed)
        .merge(rating_routes)
        .fallback(not_found);

    with_error_handling(router, debug)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn error_envelope(status: StatusCode, message: &str) -> impl IntoResponse {
    (
        status,
        Json(ErrorResponse {
            message: message.to_string(),
            details: None,
        }),
    )
}

async fn not_found() -> impl IntoResponse {
    error_envelope(StatusCode::NOT_FOUND, "Not Found")
}

async fn method_not_allowed() -> impl IntoResponse {
    error_envelope(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}
