use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::extractors::{ProductIdPath, ValidatedJson};
use super::{ApiError, AppState, ProductRequest};
use crate::models::CatalogItem;

pub async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CatalogItem>>, ApiError> {
    Ok(Json(state.catalog.list().await?))
}

pub async fn list_by_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<Json<Vec<CatalogItem>>, ApiError> {
    Ok(Json(state.catalog.list_by_category(&category).await?))
}

pub async fn get_product(
    State(state): State<Arc<AppState>>,
    ProductIdPath(id): ProductIdPath,
) -> Result<Json<CatalogItem>, ApiError> {
    Ok(Json(state.catalog.get(id).await?))
}

pub async fn create_product(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<ProductRequest>,
) -> Result<(StatusCode, Json<CatalogItem>), ApiError> {
    let item = state.catalog.create(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/products/{id}
/// Replaces every field. An unknown id still answers 200 with the
/// submitted item, since no existence check is made.
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    ProductIdPath(id): ProductIdPath,
    ValidatedJson(payload): ValidatedJson<ProductRequest>,
) -> Result<Json<CatalogItem>, ApiError> {
    let outcome = state.catalog.update(id, payload.into()).await?;
    Ok(Json(outcome.item))
}

/// DELETE /api/products/{id}
/// Always 204, whether or not a row was removed.
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    ProductIdPath(id): ProductIdPath,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
