use chrono::{DateTime, SecondsFormat, Utc};

use super::manager::DatabaseError;

/// Current time as stored in `created_at`/`updated_at` columns.
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Normalizes SQLite's `YYYY-MM-DD HH:MM:SS[.fff]` into RFC 3339, assuming UTC
/// when no offset is present. Values that already carry an offset pass through.
pub fn normalize_datetime(value: &str) -> String {
    let trimmed = value.trim();
    let mut normalized = match trimmed.find(' ') {
        Some(idx) if !trimmed.contains('T') => format!("{}T{}", &trimmed[..idx], &trimmed[idx + 1..]),
        _ => trimmed.to_string(),
    };

    if !has_offset(&normalized) {
        normalized.push('Z');
    }
    normalized
}

fn has_offset(value: &str) -> bool {
    if value.ends_with('Z') || value.ends_with('z') {
        return true;
    }
    // time part only, so the date's dashes do not count as an offset sign
    let time = match value.find('T') {
        Some(idx) => &value[idx + 1..],
        None => return false,
    };
    time.contains('+') || time.contains('-')
}

/// Parses a stored timestamp column.
pub fn parse(column: &str, value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(&normalize_datetime(value))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::Corrupt(format!("{} '{}': {}", column, value, e)))
}
