use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::timestamps;
use crate::database::DatabaseError;
use crate::validation::{check_flag, check_non_empty, check_not_null, double_option, flag, Validate, ValidationErrors};

/// Physical store location shown on the storefront.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Branch {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[serde(serialize_with = "flag::serialize")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct BranchRow {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<BranchRow> for Branch {
    type Error = DatabaseError;

    fn try_from(row: BranchRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::Corrupt(format!("branch id '{}': {}", row.id, e)))?;
        if row.name.is_empty() {
            return Err(DatabaseError::Corrupt(format!("branch {} has an empty name", id)));
        }

        Ok(Branch {
            id,
            name: row.name,
            address: row.address,
            phone: row.phone,
            is_active: row.is_active.unwrap_or(1) == 1,
            created_at: timestamps::parse("created_at", &row.created_at)?,
            updated_at: timestamps::parse("updated_at", &row.updated_at)?,
        })
    }
}

fn default_active() -> i64 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBranch {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: i64,
}

impl Validate for CreateBranch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_non_empty(&mut errors, "name", &self.name);
        check_flag(&mut errors, "is_active", self.is_active);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBranch {
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub is_active: Option<Option<i64>>,
}

impl Validate for UpdateBranch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_not_null(&mut errors, "name", &self.name);
        check_not_null(&mut errors, "is_active", &self.is_active);

        if let Some(Some(name)) = &self.name {
            check_non_empty(&mut errors, "name", name);
        }
        if let Some(Some(is_active)) = self.is_active {
            check_flag(&mut errors, "is_active", is_active);
        }
        errors.into_result()
    }
}
