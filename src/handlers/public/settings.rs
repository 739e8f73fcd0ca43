use axum::extract::State;

use crate::app::AppState;
use crate::database::models::Settings;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /settings - Store settings, initialised with defaults on first read
pub async fn show(State(state): State<AppState>) -> ApiResult<Settings> {
    let settings = state.db.settings().get().await?;
    Ok(ApiResponse::success(settings))
}
