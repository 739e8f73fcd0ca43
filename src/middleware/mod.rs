pub mod auth;
pub mod rate_limit;
pub mod response;
pub mod security_headers;

pub use auth::{require_admin, AuthenticatedAdmin};
pub use rate_limit::login_rate_limit;
pub use response::{ApiMessage, ApiResponse, ApiResult};
pub use security_headers::with_security_headers;
