// handlers/public/auth/session.rs - GET /auth/me and POST /auth/logout

use axum::extract::State;
use tower_cookies::Cookies;

use crate::app::AppState;
use crate::auth::session::{authenticate, clear_session_cookie, SessionError};
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiMessage, ApiResponse, ApiResult};

/// GET /auth/me - Current admin, re-validated against the database
pub async fn me(State(state): State<AppState>, cookies: Cookies) -> ApiResult<User> {
    match authenticate(&state.db, &state.config, &cookies).await {
        Ok(user) => Ok(ApiResponse::success(user)),
        Err(SessionError::Missing) => Err(ApiError::unauthorized("Not authenticated")),
        Err(SessionError::Invalid | SessionError::UserGone) => Err(ApiError::unauthorized("Invalid session")),
        Err(err) => Err(err.into()),
    }
}

/// POST /auth/logout - Clear the session cookie (idempotent)
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> ApiMessage {
    clear_session_cookie(&cookies, &state.config.security);
    tracing::debug!("Session cookie cleared");
    ApiMessage::new("Signed out")
}
