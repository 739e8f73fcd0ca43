use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::map_rows;
use crate::database::changeset::{ensure_updated, Changeset};
use crate::database::manager::DatabaseError;
use crate::database::models::{CreateProduct, Product, ProductRow, UpdateProduct};
use crate::database::timestamps;

const PRODUCT_COLUMNS: &str = "id, name, description, price_cents, stock, is_active, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every product, newest first (admin view).
    pub async fn list_all(&self) -> Result<Vec<Product>, DatabaseError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products ORDER BY created_at DESC",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        map_rows(rows)
    }

    /// Active products by name (storefront view).
    pub async fn list_active(&self) -> Result<Vec<Product>, DatabaseError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products WHERE is_active = 1 ORDER BY name ASC",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        map_rows(rows)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Product>, DatabaseError> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("SELECT {} FROM products WHERE id = ?", PRODUCT_COLUMNS))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        row.map(Product::try_from).transpose()
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM products WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    pub async fn create(&self, input: CreateProduct) -> Result<Product, DatabaseError> {
        let id = Uuid::new_v4();
        let now = timestamps::now();

        sqlx::query(
            "INSERT INTO products (id, name, description, price_cents, stock, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price_cents)
        .bind(input.stock)
        .bind(input.is_active)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        debug!("Created product {} ({})", id, input.name);
        self.refetch(id).await
    }

    pub async fn update(&self, id: Uuid, input: UpdateProduct) -> Result<Product, DatabaseError> {
        let mut changes = Changeset::new("products");
        if let Some(Some(name)) = input.name {
            changes.set("name", name);
        }
        if let Some(description) = input.description {
            changes.set("description", description);
        }
        if let Some(Some(price_cents)) = input.price_cents {
            changes.set("price_cents", price_cents);
        }
        if let Some(Some(stock)) = input.stock {
            changes.set("stock", stock);
        }
        if let Some(Some(is_active)) = input.is_active {
            changes.set("is_active", is_active);
        }

        if changes.is_empty() {
            return self.refetch(id).await;
        }

        let rows = changes
            .execute(&self.pool, "id", id.to_string(), timestamps::now())
            .await?;
        ensure_updated(rows, "Product")?;
        self.refetch(id).await
    }

    /// Hard delete; the image row goes with it through the foreign key.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn refetch(&self, id: Uuid) -> Result<Product, DatabaseError> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Product not found".to_string()))
    }
}
