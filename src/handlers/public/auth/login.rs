// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::State, http::HeaderMap};
use serde::Serialize;
use tower_cookies::Cookies;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::session::session_cookie;
use crate::auth::{generate_token, password, Claims};
use crate::database::models::UserRole;
use crate::error::ApiError;
use crate::handlers::utils::{present_str, read_json, screen_sql, RawBody};
use crate::middleware::{ApiResponse, ApiResult};
use crate::rate_limit::client_fingerprint;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

/// POST /auth/login - Verify credentials and start an admin session
///
/// Body: `{"email": "...", "password": "..."}`. On success the session
/// cookie is set and the attempt counter for the caller is cleared.
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    headers: HeaderMap,
    body: RawBody,
) -> ApiResult<LoginResponse> {
    let config = &state.config;
    let body = read_json(&body?, config.api.max_json_body_bytes)?;

    let (email, plain) = match (present_str(&body, "email"), present_str(&body, "password")) {
        (Some(email), Some(plain)) => (email, plain),
        _ => return Err(ApiError::bad_request("Email and password are required")),
    };
    screen_sql(email, "email")?;

    let users = state.db.users(config.security.bcrypt_cost);
    let Some(user) = users.get_credentials_by_email(email).await? else {
        info!("Login failed for unknown email {}", email);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    if !user.is_active {
        warn!("Login refused for inactive user {}", user.email);
        return Err(ApiError::forbidden("User is inactive"));
    }
    if user.role != UserRole::Admin {
        warn!("Login refused for non-admin user {}", user.email);
        return Err(ApiError::forbidden("You do not have access to the admin panel"));
    }

    let Some(stored) = user.password.as_deref() else {
        info!("Login failed for {}: no password set", user.email);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    let verified = password::verify_password(plain, stored).await.map_err(|e| {
        error!("Password verification failed: {}", e);
        ApiError::internal_server_error("Error while signing in")
    })?;
    if !verified {
        info!("Login failed for {}: wrong password", user.email);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    if config.security.rehash_legacy_passwords && !password::is_bcrypt_hash(stored) {
        // rehash failures are logged, not fatal
        match users.set_password(user.id, plain).await {
            Ok(()) => info!("Upgraded legacy password for {}", user.email),
            Err(e) => error!("Could not upgrade legacy password for {}: {}", user.email, e),
        }
    }

    let claims = Claims::new(
        user.id.to_string(),
        user.email.clone(),
        user.role,
        config.security.session_max_age_days,
    );
    let token = generate_token(&claims, &config.security).map_err(|e| {
        error!("Session token generation failed: {}", e);
        ApiError::internal_server_error("Error while signing in")
    })?;
    cookies.add(session_cookie(token, &config.security));

    state.login_limiter.reset(&client_fingerprint(&headers)).await;
    info!("Login ok for {}", user.email);

    Ok(ApiResponse::success(LoginResponse {
        id: user.id,
        email: user.email,
        role: user.role,
    }))
}
