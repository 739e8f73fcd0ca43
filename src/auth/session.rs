use thiserror::Error;
use tower_cookies::cookie::time::Duration;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};
use tracing::{info, warn};
use uuid::Uuid;

use super::{decode_token, Claims, TokenError};
use crate::config::{AppConfig, SecurityConfig};
use crate::database::models::User;
use crate::database::{Database, DatabaseError};
use crate::security;

/// Why a request could not be tied to an admin session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No session")]
    Missing,

    #[error("Invalid session")]
    Invalid,

    #[error("User no longer exists")]
    UserGone,

    #[error("Account is inactive or lacks admin access")]
    Forbidden,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Builds the `HttpOnly` session cookie carrying `token`.
pub fn session_cookie(token: String, security: &SecurityConfig) -> Cookie<'static> {
    let mut cookie = Cookie::new(security.session_cookie_name.clone(), token);
    cookie.set_http_only(true);
    cookie.set_secure(security.secure_cookies);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(Duration::days(security.session_max_age_days));
    cookie
}

/// Expires the session cookie on the client.
pub fn clear_session_cookie(cookies: &Cookies, security: &SecurityConfig) {
    let mut cookie = session_cookie(String::new(), security);
    cookie.set_max_age(Duration::ZERO);
    cookies.add(cookie);
}

/// Reads the session cookie and re-validates it against the database.
///
/// Any session that cannot be honoured is cleared before the error returns,
/// except when no cookie was sent at all.
pub async fn authenticate(db: &Database, config: &AppConfig, cookies: &Cookies) -> Result<User, SessionError> {
    let security = &config.security;
    let token = match cookies.get(&security.session_cookie_name) {
        Some(cookie) if !cookie.value().is_empty() => cookie.value().to_string(),
        _ => return Err(SessionError::Missing),
    };

    let result = validate(db, config, &token).await;
    if matches!(
        result,
        Err(SessionError::Invalid | SessionError::UserGone | SessionError::Forbidden)
    ) {
        clear_session_cookie(cookies, security);
    }
    result
}

async fn validate(db: &Database, config: &AppConfig, token: &str) -> Result<User, SessionError> {
    let claims = match decode_token(token, &config.security) {
        Ok(claims) => claims,
        Err(TokenError::InvalidSecret) => {
            warn!("Session secret is empty; refusing every session");
            return Err(SessionError::Invalid);
        }
        Err(e) => {
            info!("Discarding unreadable session: {}", e);
            return Err(SessionError::Invalid);
        }
    };

    let user_id = parse_user_id(&claims)?;
    let user = db
        .users(config.security.bcrypt_cost)
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| {
            info!("Session for deleted user {}", user_id);
            SessionError::UserGone
        })?;

    if !user.can_administer() {
        warn!("Session for {} refused: role={} active={}", user.email, user.role, user.is_active);
        return Err(SessionError::Forbidden);
    }
    Ok(user)
}

fn parse_user_id(claims: &Claims) -> Result<Uuid, SessionError> {
    if !security::is_valid_uuid(&claims.user_id) {
        warn!("Session carries a malformed user id");
        return Err(SessionError::Invalid);
    }
    Uuid::parse_str(&claims.user_id).map_err(|_| SessionError::Invalid)
}
