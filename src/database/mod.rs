pub mod changeset;
pub mod manager;
pub mod models;
pub mod repository;
pub mod timestamps;

pub use manager::{Database, DatabaseError};
pub use repository::{
    BranchRepository, ProductImageRepository, ProductRepository, SettingsRepository, UserRepository,
};
