use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::rate_limit::client_fingerprint;

/// Counts login attempts per caller and answers 429 before the handler runs.
pub async fn login_rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let key = client_fingerprint(request.headers());

    if let Err(limited) = state.login_limiter.check(&key).await {
        tracing::warn!("Login rate limit hit for {} ({} attempts)", key, limited.attempts);
        return ApiError::from(limited).into_response();
    }

    next.run(request).await
}
