//! Opaque authentication token.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::TOKEN_KEY_BYTES;
use crate::errors::{AppError, AppResult};

/// Token issued to a user; one per user, reused on every successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub key: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("key", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl AuthToken {
    /// Fresh random key: 20 bytes from the OS RNG, lowercase hex.
    pub fn generate_key() -> AppResult<String> {
        let mut bytes = [0u8; TOKEN_KEY_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| AppError::internal(format!("Token generation failed: {}", e)))?;
        Ok(hex::encode(bytes))
    }
}

/// Body returned by the token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Opaque token for the `Authorization: Token <key>` header
    #[schema(example = "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b")]
    pub token: String,
}

impl From<AuthToken> for TokenResponse {
    fn from(token: AuthToken) -> Self {
        Self { token: token.key }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_key_is_40_lowercase_hex() {
        let key = AuthToken::generate_key().unwrap();

        assert_eq!(key.len(), TOKEN_KEY_BYTES * 2);
        assert!(key.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_generated_keys_differ() {
        let a = AuthToken::generate_key().unwrap();
        let b = AuthToken::generate_key().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_token_response_carries_key() {
        let token = AuthToken {
            key: "abc123".to_string(),
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };

        assert!(!format!("{:?}", token).contains("abc123"));
        let json = serde_json::to_value(TokenResponse::from(token)).unwrap();
        assert_eq!(json, serde_json::json!({ "token": "abc123" }));
    }
}
