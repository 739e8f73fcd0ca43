// handlers/public/auth/mod.rs - Session endpoints
//
// Login is the only route behind the attempt limiter; me and logout
// operate on whatever cookie the browser sends.

pub mod login;
pub mod session;

pub use login::login;
pub use session::{logout, me};
