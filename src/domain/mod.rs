//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.

pub mod password;
pub mod token;
pub mod user;

pub use password::Password;
pub use token::{AuthToken, TokenResponse};
pub use user::{
    normalize_email, CreateUser, NewUser, UpdateUser, User, UserChanges,
    UserResponse, USERNAME_PATTERN,
};
