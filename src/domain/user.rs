//! User domain entity and related types.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Password;

/// User domain entity
#[derive(Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Argon2id PHC string. Empty once the value has been handed to a caller.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("password_hash", &"[REDACTED]")
            .field("is_active", &self.is_active)
            .field("date_joined", &self.date_joined)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl User {
    /// The stored password as a verifiable value object.
    pub fn password(&self) -> Password {
        Password::from_hash(self.password_hash.clone())
    }

    /// Check a plaintext password against the stored hash.
    pub fn check_password(&self, plain_text: &str) -> bool {
        self.password().verify(plain_text)
    }

    /// Drop the stored hash so it cannot travel any further.
    pub fn clear_password(&mut self) {
        self.password_hash.clear();
    }

    /// Owned variant of [`User::clear_password`].
    pub fn without_password(mut self) -> Self {
        self.clear_password();
        self
    }
}

/// Lower-case the domain part of an email address, keeping the local part.
///
/// Mailbox names may be case sensitive; domains are not.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Characters allowed in a username: word characters and `@ . + -`.
/// Blank input is left to the length check.
pub static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]*$").expect("username pattern compiles"));

/// Validated registration data, ready for the user service.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// Validated partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.password.is_none()
    }
}

/// Row data for inserting a user; the password is already hashed.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// Column changes for an existing user; the password is already hashed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password_hash: Option<String>,
}

/// User representation returned to clients. Has no password field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// Unique user identifier (read-only)
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "testuser1")]
    pub username: String,
    #[schema(example = "test001@example.com")]
    pub email: String,
    #[schema(example = "Jane")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: "testuser1".to_string(),
            email: "test001@example.com".to_string(),
            first_name: "test_f_name001".to_string(),
            last_name: "test_l_name001".to_string(),
            password_hash: Password::new("testpass001").unwrap().into_string(),
            is_active: true,
            date_joined: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_normalize_email_lowercases_domain_only() {
        assert_eq!(normalize_email("John.Doe@EXAMPLE.Com"), "John.Doe@example.com");
        assert_eq!(normalize_email("  a@B.org "), "a@b.org");
        assert_eq!(normalize_email("not-an-email"), "not-an-email");
    }

    #[test]
    fn test_username_characters() {
        assert!(USERNAME_PATTERN.is_match("testuser1"));
        assert!(USERNAME_PATTERN.is_match("jane.doe+test@corp-1_x"));
        assert!(USERNAME_PATTERN.is_match("Zoë"));
        assert!(!USERNAME_PATTERN.is_match("has space"));
        assert!(!USERNAME_PATTERN.is_match("semi;colon"));
    }

    #[test]
    fn test_check_password() {
        let user = sample_user();
        assert!(user.check_password("testpass001"));
        assert!(!user.check_password("wrongpass"));
    }

    #[test]
    fn test_cleared_password_never_verifies() {
        let user = sample_user().without_password();
        assert!(user.password_hash.is_empty());
        assert!(!user.check_password("testpass001"));
    }

    #[test]
    fn test_serialized_user_has_no_password() {
        let user = sample_user();
        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "testuser1");
    }

    #[test]
    fn test_debug_redacts_hash() {
        let user = sample_user();
        let debug = format!("{:?}", user);
        assert!(!debug.contains(&user.password_hash));
    }

    #[test]
    fn test_user_response_fields() {
        let user = sample_user();
        let id = user.id;
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();

        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, ["email", "first_name", "id", "last_name", "username"]);
        assert_eq!(json["id"], id.to_string());
    }

    #[test]
    fn test_update_user_is_empty() {
        assert!(UpdateUser::default().is_empty());
        let update = UpdateUser {
            first_name: Some("New".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
