use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;
use crate::security;
use crate::validation::{Validate, ValidationErrors};

/// Parses a path id, answering 400 for anything but a canonical UUID.
pub fn parse_uuid(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    if !security::is_valid_uuid(raw) {
        return Err(ApiError::bad_request(format!("Invalid {} id", what)));
    }
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid {} id", what)))
}

/// Request body as extracted by handlers, so buffering failures still
/// answer in the JSON envelope.
pub type RawBody = Result<Bytes, BytesRejection>;

/// Size-checks and parses a raw JSON body.
pub fn read_json(body: &Bytes, max_bytes: usize) -> Result<Value, ApiError> {
    if !security::validate_payload_size(body, max_bytes) {
        return Err(ApiError::payload_too_large("Payload too large"));
    }
    serde_json::from_slice(body).map_err(|e| ApiError::invalid_json(format!("Invalid JSON body: {}", e)))
}

/// Converts an already-parsed body into a typed payload and validates it.
pub fn decode<T>(value: Value) -> Result<T, ApiError>
where
    T: DeserializeOwned + Validate,
{
    let payload: T = serde_json::from_value(value)
        .map_err(|e| ApiError::from(ValidationErrors::single("body", e.to_string())))?;
    payload.validate()?;
    Ok(payload)
}

/// String value of `field` when present, non-null and non-empty.
pub fn present_str<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Rejects identifier-like input that matches the SQL keyword screen.
pub fn screen_sql(value: &str, field: &str) -> Result<(), ApiError> {
    if security::contains_sql_injection(value) {
        tracing::warn!("Rejected {} containing SQL-like pattern", field);
        return Err(ApiError::bad_request(format!("Invalid {}", field)));
    }
    Ok(())
}
