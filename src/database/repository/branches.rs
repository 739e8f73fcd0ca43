use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::map_rows;
use crate::database::changeset::{ensure_updated, Changeset};
use crate::database::manager::DatabaseError;
use crate::database::models::{Branch, BranchRow, CreateBranch, UpdateBranch};
use crate::database::timestamps;

const BRANCH_COLUMNS: &str = "id, name, address, phone, is_active, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct BranchRepository {
    pool: SqlitePool,
}

impl BranchRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Branch>, DatabaseError> {
        let rows: Vec<BranchRow> = sqlx::query_as(&format!(
            "SELECT {} FROM branches ORDER BY created_at DESC",
            BRANCH_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        map_rows(rows)
    }

    pub async fn list_active(&self) -> Result<Vec<Branch>, DatabaseError> {
        let rows: Vec<BranchRow> = sqlx::query_as(&format!(
            "SELECT {} FROM branches WHERE is_active = 1 ORDER BY name ASC",
            BRANCH_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        map_rows(rows)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Branch>, DatabaseError> {
        let row: Option<BranchRow> =
            sqlx::query_as(&format!("SELECT {} FROM branches WHERE id = ?", BRANCH_COLUMNS))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        row.map(Branch::try_from).transpose()
    }

    pub async fn create(&self, input: CreateBranch) -> Result<Branch, DatabaseError> {
        let id = Uuid::new_v4();
        let now = timestamps::now();

        sqlx::query(
            "INSERT INTO branches (id, name, address, phone, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(&input.name)
        .bind(&input.address)
        .bind(&input.phone)
        .bind(input.is_active)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        debug!("Created branch {} ({})", id, input.name);
        self.refetch(id).await
    }

    pub async fn update(&self, id: Uuid, input: UpdateBranch) -> Result<Branch, DatabaseError> {
        let mut changes = Changeset::new("branches");
        if let Some(Some(name)) = input.name {
            changes.set("name", name);
        }
        if let Some(address) = input.address {
            changes.set("address", address);
        }
        if let Some(phone) = input.phone {
            changes.set("phone", phone);
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
        ensure_updated(rows, "Branch")?;
        self.refetch(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM branches WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn refetch(&self, id: Uuid) -> Result<Branch, DatabaseError> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Branch not found".to_string()))
    }
}
