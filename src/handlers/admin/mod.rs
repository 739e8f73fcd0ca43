// handlers/admin/mod.rs - Admin handlers (session required)
//
// Catalog writes, settings, and user management.
//
// Security Level: Active admin session
// Middleware: require_admin (re-validates the session cookie per request)

pub mod branches;
pub mod images;
pub mod products;
pub mod settings;
pub mod users;
