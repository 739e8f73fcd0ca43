use axum::extract::State;
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::{Settings, UpdateSettings};
use crate::error::ApiError;
use crate::handlers::utils::{decode, present_str, read_json, RawBody};
use crate::middleware::{ApiResponse, ApiResult};
use crate::security;

/// Prechecks on the raw body. The UI may send the number as `whatsapp`.
fn precheck(body: &Value) -> Result<(), ApiError> {
    if let Some(color) = present_str(body, "accent_color") {
        if !security::is_valid_hex_color(color) {
            return Err(ApiError::bad_request("Invalid accent color"));
        }
    }

    let whatsapp = present_str(body, "default_whatsapp").or_else(|| present_str(body, "whatsapp"));
    if let Some(number) = whatsapp {
        if !security::is_valid_phone(number) {
            return Err(ApiError::bad_request("Invalid WhatsApp number"));
        }
    }
    Ok(())
}

/// PUT /settings - Patch the singleton settings row
pub async fn update(State(state): State<AppState>, body: RawBody) -> ApiResult<Settings> {
    let body = read_json(&body?, state.config.api.max_json_body_bytes)?;
    precheck(&body)?;
    let input: UpdateSettings = decode(body)?;

    let settings = state.db.settings().update(input).await?;
    tracing::info!("Store settings updated");
    Ok(ApiResponse::success(settings))
}
