//! Validated JSON extractor for Axum
//!
//! `ValidatedJson<T>` works like `axum::Json<T>`, but additionally runs
//! `validator::Validate::validate()` on the deserialized value. Both
//! malformed bodies and failed validation are rejected with a 422
//! carrying one entry per offending field.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::Value;
use utoipa::openapi::schema::Schema;
use utoipa::openapi::RefOr;
use utoipa::PartialSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::shared::{AppError, FieldError, RequestError};

pub const FIELD_REQUIRED: &str = "Field required";

/// An extractor that deserializes JSON and validates it.
///
/// Fields the schema marks as required are checked up front, and every
/// field with a value of the wrong shape gets its own error entry.
///
/// # Usage
///
/// ```ignore
/// #[derive(Deserialize, Validate, ToSchema)]
/// struct CreateRatingRequest {
///     #[validate(range(min = 0, max = 5))]
///     rate: i32,
/// }
///
/// async fn handler(ValidatedJson(body): ValidatedJson<CreateRatingRequest>) {
///     // `body` is guaranteed to pass validation
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + PartialSchema,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(raw) = Json::<Value>::from_request(req, state)
            .await
            .map_err(json_rejection)?;

        let value: T = deserialize_fields("body", raw, &required_fields::<T>())
            .map_err(|errors| RequestError { errors })?;

        value.validate().map_err(|errors| RequestError {
            errors: field_errors("body", &errors),
        })?;

        Ok(ValidatedJson(value))
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    RequestError::single(FieldError::new(["body"], rejection.body_text())).into()
}

/// Names of the properties `T`'s schema lists as required.
pub fn required_fields<T: PartialSchema>() -> Vec<String> {
    match T::schema() {
        RefOr::T(Schema::Object(object)) => object.required,
        _ => Vec::new(),
    }
}

/// Deserialize `raw` into `T`, reporting every offending field under `root`.
///
/// A field whose value fails to deserialize is recorded and dropped, and
/// deserialization is retried until it succeeds or only missing fields
/// remain.
pub fn deserialize_fields<T: DeserializeOwned>(
    root: &str,
    mut raw: Value,
    required: &[String],
) -> Result<T, Vec<FieldError>> {
    let mut missing: Vec<FieldError> = match &raw {
        Value::Object(map) => required
            .iter()
            .filter(|name| !map.contains_key(name.as_str()))
            .map(|name| FieldError::new([root, name.as_str()], FIELD_REQUIRED))
            .collect(),
        _ => Vec::new(),
    };
    let mut invalid: Vec<FieldError> = Vec::new();

    loop {
        let err = match serde_path_to_error::deserialize::<_, T>(raw.clone()) {
            Ok(value) if invalid.is_empty() => return Ok(value),
            Ok(_) => break,
            Err(err) => err,
        };

        let path: Vec<String> = err.path().iter().map(|segment| segment.to_string()).collect();
        let message = err.inner().to_string();

        if let (Some(field), Value::Object(map)) = (path.first(), &mut raw) {
            if map.remove(field.as_str()).is_some() {
                let location = std::iter::once(root.to_string()).chain(path.iter().cloned());
                invalid.push(FieldError::new(location, message));
                continue;
            }
        }

        match missing_field(&message) {
            Some(name) => missing.push(FieldError::new([root, name], FIELD_REQUIRED)),
            None => invalid.push(FieldError::new([root], message)),
        }
        break;
    }

    let mut errors = invalid;
    for err in missing {
        if !errors.iter().any(|e| e.location == err.location) {
            errors.push(err);
        }
    }
    errors.sort_by(|a, b| a.location.cmp(&b.location));
    Err(errors)
}

fn missing_field(message: &str) -> Option<&str> {
    message.strip_prefix("missing field `")?.split('`').next()
}

/// Flatten validator output into field errors under `root`, sorted by field.
pub fn field_errors(root: &str, errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            let location = [root.to_string(), field.to_string()];
            errs.iter()
                .map(move |e| FieldError::new(location.clone(), describe(&field, e)))
        })
        .collect()
}

fn describe(field: &str, error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| format!("{field} failed {} validation", error.code))
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use utoipa::ToSchema;

    #[derive(Debug, Deserialize, Validate, ToSchema)]
    struct TestBody {
        #[validate(length(min = 1, max = 10))]
        name: String,
        #[validate(range(min = 1, max = 100, message = "age must be between 1 and 100"))]
        age: u32,
        #[serde(default)]
        nickname: Option<String>,
    }

    async fn handler(ValidatedJson(_body): ValidatedJson<TestBody>) -> &'static str {
        "ok"
    }

    fn app() -> Router {
        Router::new().route("/test", post(handler))
    }

    async fn send(body: impl Into<Body>) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri("/test")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn valid_body_returns_ok() {
        let body = serde_json::json!({"name": "Alice", "age": 30});
        let (status, _) = send(serde_json::to_vec(&body).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_json_returns_422_at_body() {
        let (status, body) = send("not json").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "Invalid request data");
        assert_eq!(body["detail"][0]["location"], serde_json::json!(["body"]));
    }

    #[tokio::test]
    async fn missing_field_is_reported_by_name() {
        let (status, body) = send(r#"{"name": "Alice"}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["detail"],
            json!([{ "location": ["body", "age"], "message": "Field required" }])
        );
    }

    #[tokio::test]
    async fn every_malformed_field_gets_an_entry() {
        let (status, body) = send(r#"{"name": 7, "age": "thirty", "nickname": false}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let locations: Vec<Value> = body["detail"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["location"].clone())
            .collect();
        assert_eq!(
            locations,
            vec![
                json!(["body", "age"]),
                json!(["body", "name"]),
                json!(["body", "nickname"]),
            ]
        );
    }

    #[tokio::test]
    async fn missing_and_malformed_fields_are_combined() {
        let (status, body) = send(r#"{"age": -3}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let detail = body["detail"].as_array().unwrap();
        assert_eq!(detail.len(), 2);
        assert_eq!(detail[0]["location"], json!(["body", "age"]));
        assert_eq!(detail[1]["location"], json!(["body", "name"]));
        assert_eq!(detail[1]["message"], "Field required");
    }

    #[tokio::test]
    async fn non_object_body_is_reported_at_body() {
        let (status, body) = send("[1, 2]").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"][0]["location"], json!(["body"]));
    }

    #[test]
    fn required_fields_come_from_schema() {
        let mut required = required_fields::<TestBody>();
        required.sort();
        assert_eq!(required, vec!["age".to_string(), "name".to_string()]);
    }

    #[tokio::test]
    async fn validation_failure_lists_every_field() {
        let body = serde_json::json!({"name": "", "age": 0});
        let (status, body) = send(serde_json::to_vec(&body).unwrap()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let detail = body["detail"].as_array().unwrap();
        assert_eq!(detail.len(), 2);
        assert_eq!(detail[0]["location"], serde_json::json!(["body", "age"]));
        assert_eq!(detail[0]["message"], "age must be between 1 and 100");
        assert_eq!(detail[1]["location"], serde_json::json!(["body", "name"]));
    }
}
