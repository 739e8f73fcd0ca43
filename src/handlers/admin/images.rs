// handlers/admin/images.rs - Product image upload and removal

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use std::time::Duration;

use crate::app::AppState;
use crate::database::models::ProductImage;
use crate::error::ApiError;
use crate::handlers::utils::parse_uuid;
use crate::middleware::{ApiMessage, ApiResponse, ApiResult};

const FILE_FIELD: &str = "file";

/// Buffers the `file` field, stopping as soon as it passes `max_bytes`.
async fn read_file_field(multipart: &mut Multipart, max_bytes: usize) -> Result<Vec<u8>, ApiError> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        if let Some(mime) = field.content_type() {
            if !mime.starts_with("image/") {
                return Err(ApiError::bad_request(format!("Invalid content type '{}': expected an image", mime)));
            }
        }

        let mut buf = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            if buf.len() + chunk.len() > max_bytes {
                return Err(ApiError::payload_too_large(format!(
                    "File exceeds the {} byte limit",
                    max_bytes
                )));
            }
            buf.extend_from_slice(&chunk);
        }
        return Ok(buf);
    }

    Err(ApiError::bad_request("No file provided"))
}

/// POST /products/:id/image - Create or replace the product image
///
/// Multipart body with a single `file` field. The whole read-and-store
/// sequence runs under the configured upload time budget.
pub async fn upload(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ProductImage> {
    let product_id = parse_uuid(&id, "product")?;
    let mut multipart = multipart?;
    let max_bytes = state.config.api.max_image_bytes;
    let budget = Duration::from_secs(state.config.api.upload_timeout_secs);

    let work = async {
        let bytes = read_file_field(&mut multipart, max_bytes).await?;
        let image = state.db.product_images().upsert(product_id, bytes, max_bytes).await?;
        Ok::<_, ApiError>(image)
    };

    let image = match tokio::time::timeout(budget, work).await {
        Ok(result) => result?,
        Err(_) => {
            tracing::warn!("Image upload for {} exceeded {:?}", product_id, budget);
            return Err(ApiError::gateway_timeout("Upload took too long"));
        }
    };

    tracing::info!(
        "Stored {} byte {} image for product {}",
        image.bytes_size,
        image.content_type(),
        product_id
    );
    Ok(ApiResponse::created(image))
}

/// DELETE /products/:id/image
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<ApiMessage, ApiError> {
    let product_id = parse_uuid(&id, "product")?;
    if !state.db.product_images().delete(product_id).await? {
        return Err(ApiError::not_found("Image not found"));
    }
    Ok(ApiMessage::new("Image deleted"))
}
