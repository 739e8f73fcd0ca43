use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::session;
use crate::database::models::User;
use crate::error::ApiError;

/// Admin resolved from the session cookie for the current request.
#[derive(Clone, Debug)]
pub struct AuthenticatedAdmin {
    pub user_id: Uuid,
    pub email: String,
}

impl From<User> for AuthenticatedAdmin {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
        }
    }
}

/// Re-validates the session against the database on every privileged request.
pub async fn require_admin(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request,
    next: Next,
) -> Response {
    match session::authenticate(&state.db, &state.config, &cookies).await {
        Ok(user) => {
            tracing::debug!("Admin {} -> {} {}", user.email, request.method(), request.uri().path());
            request.extensions_mut().insert(AuthenticatedAdmin::from(user));
            next.run(request).await
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}
