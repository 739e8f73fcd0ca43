// handlers/public/products.rs - Catalog reads

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::Product;
use crate::error::ApiError;
use crate::handlers::utils::parse_uuid;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub active: Option<String>,
}

impl ListQuery {
    /// `?active=true` selects the storefront view.
    pub fn only_active(&self) -> bool {
        self.active.as_deref() == Some("true")
    }
}

/// GET /products - All products, or `?active=true` for active ones by name
pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<Vec<Product>> {
    let repo = state.db.products();
    let products = if query.only_active() {
        repo.list_active().await?
    } else {
        repo.list_all().await?
    };
    Ok(ApiResponse::success(products))
}

/// GET /products/:id - Single product
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Product> {
    let id = parse_uuid(&id, "product")?;
    state
        .db
        .products()
        .get_by_id(id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("Product not found"))
}
