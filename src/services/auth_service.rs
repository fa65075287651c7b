//! Authentication service - credential checks and opaque token issuance.

use async_trait::async_trait;
use sea_orm::SqlErr;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{normalize_email, AuthToken, Password, User};
use crate::errors::{AppError, AppResult};
use crate::infra::Repositories;

/// How the caller identifies the account they are logging into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginIdentifier {
    Username(String),
    Email(String),
}

/// Login credentials. The password is never printed.
#[derive(Clone)]
pub struct Credentials {
    pub identifier: LoginIdentifier,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check credentials and return the user's token, creating it on first login.
    async fn obtain_token(&self, credentials: Credentials) -> AppResult<AuthToken>;

    /// Resolve a token key to its active owner.
    async fn authenticate(&self, key: &str) -> AppResult<User>;
}

/// Concrete implementation of AuthService.
pub struct Authenticator<R: Repositories> {
    repos: Arc<R>,
}

impl<R: Repositories> Authenticator<R> {
    pub fn new(repos: Arc<R>) -> Self {
        Self { repos }
    }

    /// Existing token for the user, or a freshly stored one.
    async fn token_for(&self, user_id: Uuid) -> AppResult<AuthToken> {
        let tokens = self.repos.tokens();
        if let Some(token) = tokens.find_by_user(user_id).await? {
            return Ok(token);
        }

        let key = AuthToken::generate_key()?;
        match tokens.create(user_id, key).await {
            Ok(token) => {
                tracing::info!(user_id = %user_id, "Token created");
                Ok(token)
            }
            // A concurrent login for the same user won the insert.
            Err(AppError::Database(e))
                if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
            {
                tokens
                    .find_by_user(user_id)
                    .await?
                    .ok_or_else(|| AppError::internal("Token missing after insert conflict"))
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl<R: Repositories + 'static> AuthService for Authenticator<R> {
    async fn obtain_token(&self, credentials: Credentials) -> AppResult<AuthToken> {
        let users = self.repos.users();
        let found = match &credentials.identifier {
            LoginIdentifier::Username(username) => users.find_by_username(username).await?,
            LoginIdentifier::Email(email) => users.find_by_email(&normalize_email(email)).await?,
        };

        // Always pay for one hash verification so unknown accounts are not
        // distinguishable by response time.
        let stored = found
            .as_ref()
            .map(User::password)
            .unwrap_or_else(Password::dummy);
        let password_valid = stored.verify(&credentials.password);

        let user = match found {
            Some(user) if password_valid && user.is_active => user,
            _ => {
                tracing::warn!(identifier = ?credentials.identifier, "Rejected login attempt");
                return Err(AppError::InvalidCredentials);
            }
        };

        self.token_for(user.id).await
    }

    async fn authenticate(&self, key: &str) -> AppResult<User> {
        let token = self
            .repos
            .tokens()
            .find_by_key(key)
            .await?
            .ok_or(AppError::Unauthorized)?;

        match self.repos.users().find_by_id(token.user_id).await? {
            Some(user) if user.is_active => Ok(user.without_password()),
            _ => Err(AppError::Unauthorized),
        }
    }
}
