pub mod branches;
pub mod product_images;
pub mod products;
pub mod settings;
pub mod users;

pub use branches::BranchRepository;
pub use product_images::ProductImageRepository;
pub use products::ProductRepository;
pub use settings::SettingsRepository;
pub use users::UserRepository;

use super::manager::{Database, DatabaseError};

impl Database {
    pub fn users(&self, bcrypt_cost: u32) -> UserRepository {
        UserRepository::new(self.pool().clone(), bcrypt_cost)
    }

    pub fn branches(&self) -> BranchRepository {
        BranchRepository::new(self.pool().clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool().clone())
    }

    pub fn product_images(&self) -> ProductImageRepository {
        ProductImageRepository::new(self.pool().clone())
    }

    pub fn settings(&self) -> SettingsRepository {
        SettingsRepository::new(self.pool().clone())
    }
}

/// Converts fetched rows into domain values, failing on the first corrupt row.
pub(crate) fn map_rows<R, T>(rows: Vec<R>) -> Result<Vec<T>, DatabaseError>
where
    T: TryFrom<R, Error = DatabaseError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::database::Database;

    pub async fn migrated_db() -> Database {
        let db = Database::connect_in_memory().await.expect("in-memory database");
        db.migrate().await.expect("migrations");
        db
    }
}
