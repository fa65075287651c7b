//! HTTP request handlers.

pub mod token_handler;
pub mod user_handler;

pub use token_handler::token_routes;
pub use user_handler::{account_routes, user_routes};
