//! Stateless input predicates shared by the request handlers.
//!
//! These sit in front of the validation layer. None of them replace the
//! parameterized queries used by the repositories.

use once_cell::sync::Lazy;
use regex::Regex;

/// Default ceiling for JSON request bodies.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 10 * 1024;

/// Maximum accepted email length.
pub const MAX_EMAIL_LENGTH: usize = 255;

const MAX_SANITIZED_LENGTH: usize = 1000;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").expect("uuid regex")
});

static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("hex color regex"));

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d\s+\-()]{10,20}$").expect("phone regex"));

static SQL_KEYWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(SELECT|INSERT|UPDATE|DELETE|DROP|CREATE|ALTER|EXEC|EXECUTE|UNION|SCRIPT)\b")
        .expect("sql keyword regex")
});

static SQL_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(--|#|/\*|\*/|;|xp_|sp_)").expect("sql token regex"));

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LENGTH && EMAIL_RE.is_match(email)
}

/// Canonical 8-4-4-4-12 hex form, either case.
pub fn is_valid_uuid(value: &str) -> bool {
    UUID_RE.is_match(value)
}

/// Exactly `#RRGGBB`. The three digit short form is rejected.
pub fn is_valid_hex_color(color: &str) -> bool {
    HEX_COLOR_RE.is_match(color)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// True when the serialized body fits within `max_bytes`.
pub fn validate_payload_size(body: &[u8], max_bytes: usize) -> bool {
    body.len() <= max_bytes
}

/// Heuristic screen for SQL keywords and comment/terminator tokens.
///
/// Known to reject legitimate text such as "select a size" or anything with a
/// `#`, so it is only applied to identifier-like inputs (emails).
pub fn contains_sql_injection(input: &str) -> bool {
    SQL_KEYWORD_RE.is_match(input) || SQL_TOKEN_RE.is_match(input)
}

/// Strips angle brackets, trims, and caps the result at 1000 characters.
pub fn sanitize_string(input: &str) -> String {
    input
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .collect::<String>()
        .trim()
        .chars()
        .take(MAX_SANITIZED_LENGTH)
        .collect()
}
