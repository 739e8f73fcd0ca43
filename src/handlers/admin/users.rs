// handlers/admin/users.rs - Admin user management

use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::{CreateUser, UpdateUser, User};
use crate::error::ApiError;
use crate::handlers::utils::{decode, parse_uuid, present_str, read_json, screen_sql, RawBody};
use crate::middleware::{ApiMessage, ApiResponse, ApiResult, AuthenticatedAdmin};
use crate::security;

/// Email shape and SQL screen, ahead of typed decoding.
fn check_email(body: &Value) -> Result<(), ApiError> {
    if let Some(email) = present_str(body, "email") {
        if !security::is_valid_email(email) {
            return Err(ApiError::bad_request("Invalid email"));
        }
        screen_sql(email, "email")?;
    }
    Ok(())
}

/// GET /users
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    let users = state.db.users(state.config.security.bcrypt_cost).list_all().await?;
    Ok(ApiResponse::success(users))
}

/// POST /users - Create a user; the password is hashed before storage
pub async fn create(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthenticatedAdmin>,
    body: RawBody,
) -> ApiResult<User> {
    let body = read_json(&body?, state.config.api.max_json_body_bytes)?;
    check_email(&body)?;
    let input: CreateUser = decode(body)?;

    let user = state.db.users(state.config.security.bcrypt_cost).create(input).await?;
    tracing::info!("{} created user {} ({})", admin.email, user.email, user.role);
    Ok(ApiResponse::created(user))
}

/// GET /users/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    let id = parse_uuid(&id, "user")?;
    state
        .db
        .users(state.config.security.bcrypt_cost)
        .get_by_id(id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// PUT /users/:id - Partial update
pub async fn update(State(state): State<AppState>, Path(id): Path<String>, body: RawBody) -> ApiResult<User> {
    let id = parse_uuid(&id, "user")?;
    let body = read_json(&body?, state.config.api.max_json_body_bytes)?;
    check_email(&body)?;
    let input: UpdateUser = decode(body)?;

    let user = state.db.users(state.config.security.bcrypt_cost).update(id, input).await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /users/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthenticatedAdmin>,
    Path(id): Path<String>,
) -> Result<ApiMessage, ApiError> {
    let id = parse_uuid(&id, "user")?;
    if !state.db.users(state.config.security.bcrypt_cost).delete(id).await? {
        return Err(ApiError::not_found("User not found"));
    }
    tracing::info!("{} ({}) deleted user {}", admin.email, admin.user_id, id);
    Ok(ApiMessage::new("User deleted"))
}

/// GET /users/email/:email
pub async fn show_by_email(State(state): State<AppState>, Path(email): Path<String>) -> ApiResult<User> {
    screen_sql(&email, "email")?;
    state
        .db
        .users(state.config.security.bcrypt_cost)
        .get_by_email(&email)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("User not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn email_precheck() {
        assert!(check_email(&json!({"name": "No email"})).is_ok());
        assert!(check_email(&json!({"email": "owner@shop.mx"})).is_ok());
        assert!(check_email(&json!({"email": "not-an-email"})).is_err());
        assert!(check_email(&json!({"email": "x@y.mx' OR 1=1 --"})).is_err());
    }
}
