use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::timestamps;
use crate::database::DatabaseError;
use crate::validation::{
    check_flag, check_non_empty, check_non_negative, check_not_null, double_option, flag, Validate, ValidationErrors,
};

/// Catalog entry. Prices are integer minor units of the store currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
    #[serde(serialize_with = "flag::serialize")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub stock: Option<i64>,
    pub is_active: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<ProductRow> for Product {
    type Error = DatabaseError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::Corrupt(format!("product id '{}': {}", row.id, e)))?;

        let price_cents = row.price_cents.unwrap_or(0);
        let stock = row.stock.unwrap_or(0);
        if price_cents < 0 || stock < 0 {
            return Err(DatabaseError::Corrupt(format!(
                "product {} has negative price or stock",
                id
            )));
        }

        Ok(Product {
            id,
            name: row.name,
            description: row.description,
            price_cents,
            stock,
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
pub struct CreateProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: i64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_active")]
    pub is_active: i64,
}

impl Validate for CreateProduct {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_non_empty(&mut errors, "name", &self.name);
        check_non_negative(&mut errors, "price_cents", self.price_cents);
        check_non_negative(&mut errors, "stock", self.stock);
        check_flag(&mut errors, "is_active", self.is_active);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduct {
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub price_cents: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub stock: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub is_active: Option<Option<i64>>,
}

impl Validate for UpdateProduct {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_not_null(&mut errors, "name", &self.name);
        check_not_null(&mut errors, "price_cents", &self.price_cents);
        check_not_null(&mut errors, "stock", &self.stock);
        check_not_null(&mut errors, "is_active", &self.is_active);

        if let Some(Some(name)) = &self.name {
            check_non_empty(&mut errors, "name", name);
        }
        if let Some(Some(price)) = self.price_cents {
            check_non_negative(&mut errors, "price_cents", price);
        }
        if let Some(Some(stock)) = self.stock {
            check_non_negative(&mut errors, "stock", stock);
        }
        if let Some(Some(is_active)) = self.is_active {
            check_flag(&mut errors, "is_active", is_active);
        }
        errors.into_result()
    }
}
