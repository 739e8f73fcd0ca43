pub mod password;
pub mod session;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::database::models::UserRole;

/// Contents of the session cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Kept as a string so a tampered id can be told apart from a bad signature.
    pub user_id: String,
    pub email: String,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, role: UserRole, max_age_days: i64) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            email: email.into(),
            role,
            exp: (now + Duration::days(max_age_days)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("session secret is not configured")]
    InvalidSecret,

    #[error("session token generation failed: {0}")]
    Generation(String),

    #[error("session token rejected: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

pub fn generate_token(claims: &Claims, security: &SecurityConfig) -> Result<String, TokenError> {
    if security.session_secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let key = EncodingKey::from_secret(security.session_secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), claims, &key).map_err(|e| TokenError::Generation(e.to_string()))
}

pub fn decode_token(token: &str, security: &SecurityConfig) -> Result<Claims, TokenError> {
    if security.session_secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let key = DecodingKey::from_secret(security.session_secret.as_bytes());
    let data = decode::<Claims>(token, &key, &Validation::new(Algorithm::HS256))?;
    Ok(data.claims)
}
