//! Request extractors shared by every handler.

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use models::schema::{parse_input, InputSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;
use service::auth::domain::AuthContext;

use crate::errors::JsonApiError;

/// JSON body checked against the input schema of `T`.
///
/// Malformed JSON is a plain 400; schema violations come back with one entry
/// per offending field.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: InputSchema + Send,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| JsonApiError::bad_request(rejection.body_text()))?;
        Ok(ValidJson(parse_input::<T>(value)?))
    }
}

/// Query string decoded into `T`; a bad parameter is a JSON 400.
pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| JsonApiError::bad_request(rejection.body_text()))?;
        Ok(ValidQuery(value))
    }
}

/// The signed-in caller, put in request extensions by the session middleware.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthContext);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| JsonApiError::unauthorized("sign in required"))
    }
}
