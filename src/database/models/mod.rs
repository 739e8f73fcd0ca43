pub mod branch;
pub mod product;
pub mod product_image;
pub mod settings;
pub mod user;

pub use branch::{Branch, BranchRow, CreateBranch, UpdateBranch};
pub use product::{CreateProduct, Product, ProductRow, UpdateProduct};
pub use product_image::{detect_content_type, ProductImage, ProductImageRow, DEFAULT_MAX_IMAGE_BYTES};
pub use settings::{Currency, Settings, SettingsRow, UpdateSettings};
pub use user::{CreateUser, UpdateUser, User, UserCredentials, UserCredentialsRow, UserRole, UserRow};
