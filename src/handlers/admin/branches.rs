use axum::extract::{Path, State};
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::{Branch, CreateBranch, UpdateBranch};
use crate::error::ApiError;
use crate::handlers::utils::{decode, parse_uuid, present_str, read_json, RawBody};
use crate::middleware::{ApiMessage, ApiResponse, ApiResult};
use crate::security;

fn check_phone(body: &Value) -> Result<(), ApiError> {
    match present_str(body, "phone") {
        Some(phone) if !security::is_valid_phone(phone) => Err(ApiError::bad_request("Invalid phone number")),
        _ => Ok(()),
    }
}

/// POST /branches - Create a branch
pub async fn create(State(state): State<AppState>, body: RawBody) -> ApiResult<Branch> {
    let body = read_json(&body?, state.config.api.max_json_body_bytes)?;
    check_phone(&body)?;
    let input: CreateBranch = decode(body)?;

    let branch = state.db.branches().create(input).await?;
    Ok(ApiResponse::created(branch))
}

/// PUT /branches/:id - Partial update
pub async fn update(State(state): State<AppState>, Path(id): Path<String>, body: RawBody) -> ApiResult<Branch> {
    let id = parse_uuid(&id, "branch")?;
    let body = read_json(&body?, state.config.api.max_json_body_bytes)?;
    check_phone(&body)?;
    let input: UpdateBranch = decode(body)?;

    let branch = state.db.branches().update(id, input).await?;
    Ok(ApiResponse::success(branch))
}

/// DELETE /branches/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<ApiMessage, ApiError> {
    let id = parse_uuid(&id, "branch")?;
    if !state.db.branches().delete(id).await? {
        return Err(ApiError::not_found("Branch not found"));
    }
    Ok(ApiMessage::new("Branch deleted"))
}
