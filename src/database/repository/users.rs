use sqlx::SqlitePool;
use tracing::{debug, error};
use uuid::Uuid;

use super::map_rows;
use crate::auth::password;
use crate::database::changeset::{ensure_updated, Changeset};
use crate::database::manager::DatabaseError;
use crate::database::models::{CreateUser, UpdateUser, User, UserCredentials, UserCredentialsRow, UserRow};
use crate::database::timestamps;

const USER_COLUMNS: &str = "id, email, name, role, is_active, created_at, updated_at";
const DUPLICATE_EMAIL: &str = "A user with that email already exists";

/// Admin accounts. Password hashes never leave this module except through
/// [`UserRepository::get_credentials_by_email`].
#[derive(Clone, Debug)]
pub struct UserRepository {
    pool: SqlitePool,
    bcrypt_cost: u32,
}

impl UserRepository {
    pub fn new(pool: SqlitePool, bcrypt_cost: u32) -> Self {
        Self { pool, bcrypt_cost }
    }

    pub async fn list_all(&self) -> Result<Vec<User>, DatabaseError> {
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users ORDER BY created_at DESC", USER_COLUMNS))
                .fetch_all(&self.pool)
                .await?;
        map_rows(rows)
    }

    pub async fn list_active(&self) -> Result<Vec<User>, DatabaseError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE is_active = 1 ORDER BY name ASC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        map_rows(rows)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    /// Login lookup, including the stored password.
    pub async fn get_credentials_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DatabaseError> {
        let row: Option<UserCredentialsRow> =
            sqlx::query_as("SELECT id, email, password, role, is_active FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        row.map(UserCredentials::try_from).transpose()
    }

    pub async fn create(&self, input: CreateUser) -> Result<User, DatabaseError> {
        let id = Uuid::new_v4();
        let now = timestamps::now();
        let hash = self.hash(&input.password).await?;

        sqlx::query(
            "INSERT INTO users (id, email, name, password, role, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(&input.email)
        .bind(&input.name)
        .bind(hash)
        .bind(input.role.as_str())
        .bind(input.is_active)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, DUPLICATE_EMAIL))?;

        debug!("Created user {} <{}>", id, input.email);
        self.refetch(id).await
    }

    /// Applies only the fields present in `input`; a new password is hashed first.
    pub async fn update(&self, id: Uuid, input: UpdateUser) -> Result<User, DatabaseError> {
        let hash = match &input.password {
            Some(Some(plain)) => Some(self.hash(plain).await?),
            _ => None,
        };

        let mut changes = Changeset::new("users");
        if let Some(Some(email)) = input.email {
            changes.set("email", email);
        }
        if let Some(name) = input.name {
            changes.set("name", name);
        }
        if let Some(Some(role)) = input.role {
            changes.set("role", role.to_string());
        }
        if let Some(Some(is_active)) = input.is_active {
            changes.set("is_active", is_active);
        }
        if let Some(hash) = hash {
            changes.set("password", hash);
        }

        if changes.is_empty() {
            return self.refetch(id).await;
        }

        let rows = changes
            .execute(&self.pool, "id", id.to_string(), timestamps::now())
            .await
            .map_err(|e| DatabaseError::from_write(e, DUPLICATE_EMAIL))?;
        ensure_updated(rows, "User")?;
        self.refetch(id).await
    }

    /// Replaces the stored password with a bcrypt hash of `plain`.
    pub async fn set_password(&self, id: Uuid, plain: &str) -> Result<(), DatabaseError> {
        let hash = self.hash(plain).await?;
        self.set_password_hash(id, &hash).await
    }

    pub async fn set_password_hash(&self, id: Uuid, hash: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE users SET password = ?, updated_at = ? WHERE id = ?")
            .bind(hash)
            .bind(timestamps::now())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        ensure_updated(result.rows_affected(), "User")
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn hash(&self, plain: &str) -> Result<String, DatabaseError> {
        password::hash_password(plain, self.bcrypt_cost).await.map_err(|e| {
            error!("Password hashing failed: {}", e);
            DatabaseError::Hashing(e.to_string())
        })
    }

    async fn refetch(&self, id: Uuid) -> Result<User, DatabaseError> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
    }
}
