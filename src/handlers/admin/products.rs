// handlers/admin/products.rs - Product writes

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::app::AppState;
use crate::database::models::{CreateProduct, Product, UpdateProduct};
use crate::error::ApiError;
use crate::handlers::utils::{decode, parse_uuid, read_json, RawBody};
use crate::middleware::{ApiMessage, ApiResponse, ApiResult, AuthenticatedAdmin};

/// POST /products - Create a product
pub async fn create(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthenticatedAdmin>,
    body: RawBody,
) -> ApiResult<Product> {
    let body = read_json(&body?, state.config.api.max_json_body_bytes)?;
    let input: CreateProduct = decode(body)?;

    let product = state.db.products().create(input).await?;
    tracing::info!("{} created product {}", admin.email, product.id);
    Ok(ApiResponse::created(product))
}

/// PUT /products/:id - Patch only the fields present in the body
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: RawBody,
) -> ApiResult<Product> {
    let id = parse_uuid(&id, "product")?;
    let body = read_json(&body?, state.config.api.max_json_body_bytes)?;
    let input: UpdateProduct = decode(body)?;

    let product = state.db.products().update(id, input).await?;
    Ok(ApiResponse::success(product))
}

/// DELETE /products/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<ApiMessage, ApiError> {
    let id = parse_uuid(&id, "product")?;
    if !state.db.products().delete(id).await? {
        return Err(ApiError::not_found("Product not found"));
    }
    Ok(ApiMessage::new("Product deleted"))
}
