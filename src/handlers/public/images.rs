use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::utils::parse_uuid;

/// GET /products/:id/image - Raw image bytes with the sniffed content type
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let product_id = parse_uuid(&id, "product")?;
    let image = state
        .db
        .product_images()
        .get(product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Image not found"))?;

    let content_type = image.content_type();
    let bytes = image.into_bytes();
    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_LENGTH, bytes.len().to_string()),
        ],
        bytes,
    )
        .into_response())
}
