//! Extractors that turn every malformed input into a 400 `ApiError`.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use super::ApiError;
use crate::auth::AuthContext;
use crate::domain::ProductId;

/// JSON body extractor.
///
/// Unlike `axum::Json` it does not insist on a `Content-Type` header, and
/// any failure is reported as a validation error.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::validation(format!("Invalid request body: {e}")))?;

        serde_json::from_slice(&bytes)
            .map(ValidatedJson)
            .map_err(|e| ApiError::validation(format!("Invalid request body: {e}")))
    }
}

/// `{id}` path segment parsed as a product id.
pub struct ProductIdPath(pub ProductId);

impl<S> FromRequestParts<S> for ProductIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::validation("Invalid product ID"))?;

        raw.parse::<ProductId>()
            .map(ProductIdPath)
            .map_err(|_| ApiError::validation("Invalid product ID"))
    }
}

/// Identity placed in the request extensions by the auth gate.
pub struct Authenticated(pub AuthContext);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(Authenticated)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
