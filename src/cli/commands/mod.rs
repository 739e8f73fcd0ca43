pub mod migrate;
pub mod settings;
pub mod user;
