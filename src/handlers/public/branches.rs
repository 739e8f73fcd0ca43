use axum::extract::{Path, Query, State};

use super::products::ListQuery;
use crate::app::AppState;
use crate::database::models::Branch;
use crate::error::ApiError;
use crate::handlers::utils::parse_uuid;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /branches - All branches, or `?active=true` for active ones by name
pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<Vec<Branch>> {
    let repo = state.db.branches();
    let branches = if query.only_active() {
        repo.list_active().await?
    } else {
        repo.list_all().await?
    };
    Ok(ApiResponse::success(branches))
}

/// GET /branches/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Branch> {
    let id = parse_uuid(&id, "branch")?;
    state
        .db
        .branches()
        .get_by_id(id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("Branch not found"))
}
