//! Request payload validation.
//!
//! Create payloads fill defaults through serde; update payloads keep every
//! field optional so only what the client sent reaches the SQL `SET` clause.
//! Nullable columns use `Option<Option<T>>`: the outer `None` means the field
//! was omitted, `Some(None)` means the client sent an explicit `null`.

pub mod flag;

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Per-field validation failures, in field-name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Implemented by every create/update payload.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Deserializes a present field (including `null`) as `Some(..)`.
///
/// Pair with `#[serde(default)]` so an absent field stays `None`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub fn check_non_empty(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "must not be empty");
    }
}

pub fn check_non_negative(errors: &mut ValidationErrors, field: &str, value: i64) {
    if value < 0 {
        errors.add(field, "must be greater than or equal to 0");
    }
}

pub fn check_flag(errors: &mut ValidationErrors, field: &str, value: i64) {
    if !(0..=1).contains(&value) {
        errors.add(field, "must be 0 or 1");
    }
}

/// Rejects an explicit `null` on a column that cannot hold one.
pub fn check_not_null<T>(errors: &mut ValidationErrors, field: &str, value: &Option<Option<T>>) {
    if matches!(value, Some(None)) {
        errors.add(field, "must not be null");
    }
}
