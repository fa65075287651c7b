//! Auth token repository backed by SeaORM.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::entities::auth_token::{self, ActiveModel, Entity as TokenEntity};
use crate::domain::AuthToken;
use crate::errors::AppResult;

#[cfg(test)]
use mockall::automock;

/// Token repository trait for dependency injection.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Find the token with this key
    async fn find_by_key(&self, key: &str) -> AppResult<Option<AuthToken>>;

    /// Find the token owned by a user
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<AuthToken>>;

    /// Store a new token for a user. Fails if the user already owns one.
    async fn create(&self, user_id: Uuid, key: String) -> AppResult<AuthToken>;
}

/// Concrete implementation of TokenRepository
pub struct TokenStore {
    db: DatabaseConnection,
}

impl TokenStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenRepository for TokenStore {
    async fn find_by_key(&self, key: &str) -> AppResult<Option<AuthToken>> {
        let result = TokenEntity::find_by_id(key.to_string())
            .one(&self.db)
            .await?;

        Ok(result.map(AuthToken::from))
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<AuthToken>> {
        let result = TokenEntity::find()
            .filter(auth_token::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        Ok(result.map(AuthToken::from))
    }

    async fn create(&self, user_id: Uuid, key: String) -> AppResult<AuthToken> {
        let model = ActiveModel {
            key: Set(key),
            user_id: Set(user_id),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(&self.db)
        .await?;

        Ok(AuthToken::from(model))
    }
}
