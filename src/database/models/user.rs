use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::database::timestamps;
use crate::database::DatabaseError;
use crate::security;
use crate::validation::{check_flag, check_not_null, double_option, flag, Validate, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Admin,
    Editor,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Editor => "editor",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "editor" => Ok(UserRole::Editor),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Admin-panel account. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: UserRole,
    #[serde(serialize_with = "flag::serialize")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Only active admins may use the admin surface.
    pub fn can_administer(&self) -> bool {
        self.is_active && self.role == UserRole::Admin
    }
}

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: parse_id(&row.id)?,
            email: row.email,
            name: row.name,
            role: parse_role(row.role.as_deref())?,
            is_active: row.is_active.unwrap_or(1) == 1,
            created_at: timestamps::parse("created_at", &row.created_at)?,
            updated_at: timestamps::parse("updated_at", &row.updated_at)?,
        })
    }
}

/// Login lookup row, including the stored password.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: Uuid,
    pub email: String,
    pub password: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
}

#[derive(Debug, FromRow)]
pub struct UserCredentialsRow {
    pub id: String,
    pub email: String,
    pub password: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<i64>,
}

impl TryFrom<UserCredentialsRow> for UserCredentials {
    type Error = DatabaseError;

    fn try_from(row: UserCredentialsRow) -> Result<Self, Self::Error> {
        Ok(UserCredentials {
            id: parse_id(&row.id)?,
            email: row.email,
            password: row.password,
            role: parse_role(row.role.as_deref())?,
            is_active: row.is_active.unwrap_or(1) == 1,
        })
    }
}

fn parse_id(value: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value).map_err(|e| DatabaseError::Corrupt(format!("user id '{}': {}", value, e)))
}

fn parse_role(value: Option<&str>) -> Result<UserRole, DatabaseError> {
    value
        .map(UserRole::from_str)
        .transpose()
        .map(Option::unwrap_or_default)
        .map_err(DatabaseError::Corrupt)
}

fn default_active() -> i64 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default = "default_active")]
    pub is_active: i64,
}

impl Validate for CreateUser {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if !security::is_valid_email(&self.email) {
            errors.add("email", "must be a valid email address");
        }
        if self.password.is_empty() {
            errors.add("password", "password is required");
        }
        check_flag(&mut errors, "is_active", self.is_active);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub role: Option<Option<UserRole>>,
    #[serde(default, deserialize_with = "double_option")]
    pub is_active: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub password: Option<Option<String>>,
}

impl Validate for UpdateUser {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_not_null(&mut errors, "email", &self.email);
        check_not_null(&mut errors, "role", &self.role);
        check_not_null(&mut errors, "is_active", &self.is_active);
        check_not_null(&mut errors, "password", &self.password);

        if let Some(Some(email)) = &self.email {
            if !security::is_valid_email(email) {
                errors.add("email", "must be a valid email address");
            }
        }
        if let Some(Some(password)) = &self.password {
            if password.is_empty() {
                errors.add("password", "password must have at least 1 character");
            }
        }
        if let Some(Some(is_active)) = self.is_active {
            check_flag(&mut errors, "is_active", is_active);
        }
        errors.into_result()
    }
}
