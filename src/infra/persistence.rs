//! Centralized repository access.
//!
//! Services depend on the `Repositories` trait rather than on concrete
//! stores, so they can be exercised against mocks.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repositories::{TokenRepository, TokenStore, UserRepository, UserStore};

/// Access point for every repository the services need.
pub trait Repositories: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get token repository
    fn tokens(&self) -> Arc<dyn TokenRepository>;
}

/// SeaORM-backed repositories sharing one connection pool.
pub struct Persistence {
    user_repo: Arc<UserStore>,
    token_repo: Arc<TokenStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            token_repo: Arc::new(TokenStore::new(db)),
        }
    }
}

impl Repositories for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn tokens(&self) -> Arc<dyn TokenRepository> {
        self.token_repo.clone()
    }
}
