use sqlx::SqlitePool;
use tracing::info;

use crate::database::changeset::{ensure_updated, Changeset};
use crate::database::manager::DatabaseError;
use crate::database::models::settings::{DEFAULT_ACCENT_COLOR, DEFAULT_STORE_NAME, SETTINGS_ID};
use crate::database::models::{Currency, Settings, SettingsRow, UpdateSettings};
use crate::database::timestamps;

const SETTINGS_COLUMNS: &str =
    "id, store_name, default_whatsapp, currency, accent_color, created_at, updated_at";

/// The singleton settings row.
#[derive(Clone, Debug)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Reads the settings, creating the default row on first access.
    pub async fn get(&self) -> Result<Settings, DatabaseError> {
        if let Some(settings) = self.fetch().await? {
            return Ok(settings);
        }

        self.initialize().await?;
        self.fetch()
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Settings not found".to_string()))
    }

    pub async fn update(&self, input: UpdateSettings) -> Result<Settings, DatabaseError> {
        self.get().await?;

        let mut changes = Changeset::new("settings");
        if let Some(Some(store_name)) = input.store_name {
            changes.set("store_name", store_name);
        }
        if let Some(default_whatsapp) = input.default_whatsapp {
            changes.set("default_whatsapp", default_whatsapp);
        }
        if let Some(Some(currency)) = input.currency {
            changes.set("currency", currency.to_string());
        }
        if let Some(Some(accent_color)) = input.accent_color {
            changes.set("accent_color", accent_color);
        }

        if changes.is_empty() {
            return self.get().await;
        }

        let rows = changes
            .execute(&self.pool, "id", SETTINGS_ID.to_string(), timestamps::now())
            .await?;
        ensure_updated(rows, "Settings")?;
        self.get().await
    }

    async fn fetch(&self) -> Result<Option<Settings>, DatabaseError> {
        let row: Option<SettingsRow> =
            sqlx::query_as(&format!("SELECT {} FROM settings WHERE id = ?", SETTINGS_COLUMNS))
                .bind(SETTINGS_ID)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Settings::try_from).transpose()
    }

    async fn initialize(&self) -> Result<(), DatabaseError> {
        let now = timestamps::now();
        let result = sqlx::query(
            "INSERT INTO settings (id, store_name, default_whatsapp, currency, accent_color, created_at, updated_at) \
             VALUES (?, ?, NULL, ?, ?, ?, ?) \
             ON CONFLICT(id) DO NOTHING",
        )
        .bind(SETTINGS_ID)
        .bind(DEFAULT_STORE_NAME)
        .bind(Currency::default().as_str())
        .bind(DEFAULT_ACCENT_COLOR)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            info!("Initialized default store settings");
        }
        Ok(())
    }
}
