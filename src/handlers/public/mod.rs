// handlers/public/mod.rs - Public handlers (no session required)
//
// Catalog reads used by the storefront plus the session endpoints.
//
// Security Level: None
// Middleware: login attempt limiter on POST /auth/login only

pub mod auth;
pub mod branches;
pub mod images;
pub mod products;
pub mod settings;
