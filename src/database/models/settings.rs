use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::database::timestamps;
use crate::database::DatabaseError;
use crate::security;
use crate::validation::{check_non_empty, check_not_null, double_option, Validate, ValidationErrors};

pub const SETTINGS_ID: i64 = 1;
pub const DEFAULT_STORE_NAME: &str = "FlexiShop";
pub const DEFAULT_ACCENT_COLOR: &str = "#000000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "MXN")]
    Mxn,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Mxn => "MXN",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MXN" => Ok(Currency::Mxn),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            other => Err(format!("unknown currency '{}'", other)),
        }
    }
}

/// Store-wide settings. Exactly one row exists, with `id = 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub id: i64,
    pub store_name: String,
    pub default_whatsapp: Option<String>,
    pub currency: Currency,
    pub accent_color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct SettingsRow {
    pub id: i64,
    pub store_name: Option<String>,
    pub default_whatsapp: Option<String>,
    pub currency: Option<String>,
    pub accent_color: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<SettingsRow> for Settings {
    type Error = DatabaseError;

    fn try_from(row: SettingsRow) -> Result<Self, Self::Error> {
        if row.id != SETTINGS_ID {
            return Err(DatabaseError::Corrupt(format!("settings row has id {}", row.id)));
        }

        let currency = match row.currency.as_deref() {
            Some(value) => Currency::from_str(value).map_err(DatabaseError::Corrupt)?,
            None => Currency::default(),
        };
        let accent_color = row.accent_color.unwrap_or_else(|| DEFAULT_ACCENT_COLOR.to_string());
        if !security::is_valid_hex_color(&accent_color) {
            return Err(DatabaseError::Corrupt(format!("accent_color '{}'", accent_color)));
        }

        Ok(Settings {
            id: row.id,
            store_name: row.store_name.unwrap_or_else(|| DEFAULT_STORE_NAME.to_string()),
            default_whatsapp: row.default_whatsapp,
            currency,
            accent_color,
            created_at: timestamps::parse("created_at", &row.created_at)?,
            updated_at: timestamps::parse("updated_at", &row.updated_at)?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSettings {
    #[serde(default, deserialize_with = "double_option")]
    pub store_name: Option<Option<String>>,
    #[serde(default, alias = "whatsapp", deserialize_with = "double_option")]
    pub default_whatsapp: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub currency: Option<Option<Currency>>,
    #[serde(default, deserialize_with = "double_option")]
    pub accent_color: Option<Option<String>>,
}

impl Validate for UpdateSettings {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_not_null(&mut errors, "store_name", &self.store_name);
        check_not_null(&mut errors, "currency", &self.currency);
        check_not_null(&mut errors, "accent_color", &self.accent_color);

        if let Some(Some(name)) = &self.store_name {
            check_non_empty(&mut errors, "store_name", name);
        }
        if let Some(Some(color)) = &self.accent_color {
            if !security::is_valid_hex_color(color) {
                errors.add("accent_color", "must be a hex color in #RRGGBB format");
            }
        }
        errors.into_result()
    }
}
