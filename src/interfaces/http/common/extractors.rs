//! Query and path extractors that reject with the 422 field-error shape

use axum::extract::{FromRequestParts, Query, RawPathParams};
use axum::http::request::Parts;
use axum::http::Uri;
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

use super::validated_json::field_errors;
use crate::shared::{AppError, FieldError, RequestError};

/// `axum::extract::Query<T>` plus `Validate`.
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = match Query::<T>::try_from_uri(&parts.uri) {
            Ok(Query(value)) => value,
            Err(rejection) => {
                let mut errors = query_field_errors::<T>(parts.uri.query().unwrap_or_default());
                if errors.is_empty() {
                    errors.push(FieldError::new(["query"], rejection.body_text()));
                }
                return Err(RequestError { errors }.into());
            }
        };

        value.validate().map_err(|errors| RequestError {
            errors: field_errors("query", &errors),
        })?;

        Ok(ValidatedQuery(value))
    }
}

/// Attribute a failed query string to the parameters that broke it.
///
/// Each `key=value` pair is deserialized on its own, so a parameter that
/// fails in isolation is reported under its own name. Missing-field
/// errors from the isolated parse are not attributed.
fn query_field_errors<T: DeserializeOwned>(query: &str) -> Vec<FieldError> {
    let mut errors: Vec<FieldError> = Vec::new();

    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let Ok(uri) = format!("/?{pair}").parse::<Uri>() else {
            continue;
        };
        let Err(rejection) = Query::<T>::try_from_uri(&uri) else {
            continue;
        };
        let message = rejection.body_text();
        if message.contains("missing field") {
            continue;
        }

        let key = Query::<Vec<(String, String)>>::try_from_uri(&uri)
            .ok()
            .and_then(|Query(pairs)| pairs.into_iter().next())
            .map(|(key, _)| key)
            .unwrap_or_else(|| pair.split('=').next().unwrap_or(pair).to_string());

        if errors.iter().any(|e| e.location.get(1) == Some(&key)) {
            continue;
        }
        errors.push(FieldError::new(["query".to_string(), key], message));
    }

    errors.sort_by(|a, b| a.location.cmp(&b.location));
    errors
}

/// The single UUID path parameter of a route, whatever it is named.
#[derive(Debug, Clone, Copy)]
pub struct UuidPath(pub Uuid);

impl<S> FromRequestParts<S> for UuidPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let params = RawPathParams::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                RequestError::single(FieldError::new(["path"], rejection.body_text()))
            })?;

        let Some((name, value)) = params.iter().next() else {
            return Err(
                RequestError::single(FieldError::new(["path"], "missing path parameter")).into(),
            );
        };

        Uuid::parse_str(value).map(UuidPath).map_err(|err| {
            RequestError::single(FieldError::new(
                ["path", name],
                format!("Input should be a valid UUID: {err}"),
            ))
            .into()
        })
    }
}
