//! API middleware.

mod auth;

pub use auth::{token_auth_middleware, CurrentUser};
