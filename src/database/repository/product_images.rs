use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{ProductImage, ProductImageRow};
use crate::database::repository::ProductRepository;
use crate::database::timestamps;

/// One image per product, stored as raw bytes.
#[derive(Clone, Debug)]
pub struct ProductImageRepository {
    pool: SqlitePool,
}

impl ProductImageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, product_id: Uuid) -> Result<Option<ProductImage>, DatabaseError> {
        let row: Option<ProductImageRow> = sqlx::query_as(
            "SELECT product_id, png_bytes, bytes_size, updated_at FROM product_image WHERE product_id = ?",
        )
        .bind(product_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(ProductImage::try_from).transpose()
    }

    /// Stores `bytes` as the product's image, replacing any previous one.
    ///
    /// The size ceiling is checked before touching the database.
    pub async fn upsert(&self, product_id: Uuid, bytes: Vec<u8>, max_bytes: usize) -> Result<ProductImage, DatabaseError> {
        if bytes.len() > max_bytes {
            warn!("Rejected {} byte image for product {}", bytes.len(), product_id);
            return Err(DatabaseError::TooLarge {
                size: bytes.len(),
                max: max_bytes,
            });
        }
        if bytes.is_empty() {
            return Err(DatabaseError::InvalidInput("Image file is empty".to_string()));
        }

        if !ProductRepository::new(self.pool.clone()).exists(product_id).await? {
            return Err(DatabaseError::NotFound("Product not found".to_string()));
        }

        let size = bytes.len() as i64;
        sqlx::query(
            "INSERT INTO product_image (product_id, png_bytes, bytes_size, updated_at) VALUES (?, ?, ?, ?) \
             ON CONFLICT(product_id) DO UPDATE SET \
                png_bytes = excluded.png_bytes, \
                bytes_size = excluded.bytes_size, \
                updated_at = excluded.updated_at",
        )
        .bind(product_id.to_string())
        .bind(bytes)
        .bind(size)
        .bind(timestamps::now())
        .execute(&self.pool)
        .await?;

        debug!("Stored {} byte image for product {}", size, product_id);
        self.get(product_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Image not found".to_string()))
    }

    pub async fn delete(&self, product_id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM product_image WHERE product_id = ?")
            .bind(product_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{CreateProduct, DEFAULT_MAX_IMAGE_BYTES};
    use crate::database::repository::test_support::migrated_db;
    use crate::database::repository::ProductRepository;

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13, b'I', b'H', b'D', b'R'];

    async fn product(db: &crate::database::Database) -> Uuid {
        ProductRepository::new(db.pool().clone())
            .create(CreateProduct {
                name: "Taco".to_string(),
                description: None,
                price_cents: 2500,
                stock: 1,
                is_active: 1,
            })
            .await
            .unwrap()
            .id
    }

    async fn image_rows(db: &crate::database::Database) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM product_image")
            .fetch_one(db.pool())
            .await
            .unwrap();
        count
    }

    #[tokio::test]
    async fn stores_and_returns_identical_bytes() {
        let db = migrated_db().await;
        let repo = ProductImageRepository::new(db.pool().clone());
        let id = product(&db).await;

        let stored = repo.upsert(id, PNG.to_vec(), DEFAULT_MAX_IMAGE_BYTES).await.unwrap();
        assert_eq!(stored.bytes_size, PNG.len() as i64);
        assert_eq!(stored.content_type(), "image/png");

        let fetched = repo.get(id).await.unwrap().unwrap();
        assert_eq!(fetched.into_bytes(), PNG.to_vec());
    }

    #[tokio::test]
    async fn upsert_replaces_the_single_row() {
        let db = migrated_db().await;
        let repo = ProductImageRepository::new(db.pool().clone());
        let id = product(&db).await;

        repo.upsert(id, PNG.to_vec(), DEFAULT_MAX_IMAGE_BYTES).await.unwrap();
        let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3];
        let replaced = repo.upsert(id, jpeg.clone(), DEFAULT_MAX_IMAGE_BYTES).await.unwrap();

        assert_eq!(replaced.content_type(), "image/jpeg");
        assert_eq!(image_rows(&db).await, 1);
        assert_eq!(repo.get(id).await.unwrap().unwrap().into_bytes(), jpeg);
    }

    #[tokio::test]
    async fn oversized_upload_never_reaches_the_database() {
        let db = migrated_db().await;
        let repo = ProductImageRepository::new(db.pool().clone());
        let id = product(&db).await;

        let six_mib = vec![0u8; 6 * 1024 * 1024];
        let err = repo.upsert(id, six_mib, 5 * 1024 * 1024).await.unwrap_err();
        assert!(matches!(err, DatabaseError::TooLarge { .. }));
        assert_eq!(image_rows(&db).await, 0);
    }

    #[tokio::test]
    async fn rejects_unknown_product_and_empty_files() {
        let db = migrated_db().await;
        let repo = ProductImageRepository::new(db.pool().clone());

        let err = repo.upsert(Uuid::new_v4(), PNG.to_vec(), DEFAULT_MAX_IMAGE_BYTES).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));

        let id = product(&db).await;
        let err = repo.upsert(id, Vec::new(), DEFAULT_MAX_IMAGE_BYTES).await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn image_follows_product_deletion() {
        let db = migrated_db().await;
        let repo = ProductImageRepository::new(db.pool().clone());
        let id = product(&db).await;
        repo.upsert(id, PNG.to_vec(), DEFAULT_MAX_IMAGE_BYTES).await.unwrap();

        ProductRepository::new(db.pool().clone()).delete(id).await.unwrap();
        assert!(repo.get(id).await.unwrap().is_none());
        assert!(!repo.delete(id).await.unwrap());
    }
}
