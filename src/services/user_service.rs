//! User service - registration and account updates.
//!
//! Owns the write path for user records: uniqueness checks, password
//! hashing, and making sure no hash leaves the service.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{MSG_EMAIL_TAKEN, MSG_USERNAME_TAKEN};
use crate::domain::{normalize_email, CreateUser, NewUser, Password, UpdateUser, User, UserChanges};
use crate::errors::{AppError, AppResult, FieldErrors};
use crate::infra::Repositories;

/// User service trait for dependency injection.
///
/// Every `User` returned has an empty `password_hash`.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Register a new account
    async fn create_user(&self, input: CreateUser) -> AppResult<User>;

    /// Get user by ID
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Apply a partial update to an existing account
    async fn update_user(&self, id: Uuid, input: UpdateUser) -> AppResult<User>;
}

/// Concrete implementation of UserService.
pub struct UserManager<R: Repositories> {
    repos: Arc<R>,
}

impl<R: Repositories> UserManager<R> {
    pub fn new(repos: Arc<R>) -> Self {
        Self { repos }
    }

    /// Collect uniqueness conflicts for the given username/email.
    /// `owner` is the user allowed to already hold them.
    async fn check_unique(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        owner: Option<Uuid>,
    ) -> AppResult<()> {
        let users = self.repos.users();
        let taken = |found: Option<User>| found.is_some_and(|u| Some(u.id) != owner);

        let mut errors = FieldErrors::new();
        if let Some(username) = username {
            if taken(users.find_by_username(username).await?) {
                errors.add("username", MSG_USERNAME_TAKEN);
            }
        }
        if let Some(email) = email {
            if taken(users.find_by_email(email).await?) {
                errors.add("email", MSG_EMAIL_TAKEN);
            }
        }
        errors.into_result()
    }
}

#[async_trait]
impl<R: Repositories + 'static> UserService for UserManager<R> {
    async fn create_user(&self, input: CreateUser) -> AppResult<User> {
        let email = normalize_email(&input.email);
        self.check_unique(Some(&input.username), Some(&email), None)
            .await?;

        let password = Password::new(&input.password)?;
        let user = self
            .repos
            .users()
            .create(NewUser {
                username: input.username,
                email,
                first_name: input.first_name,
                last_name: input.last_name,
                password_hash: password.into_string(),
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user.without_password())
    }

    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.repos
            .users()
            .find_by_id(id)
            .await?
            .map(User::without_password)
            .ok_or(AppError::NotFound)
    }

    async fn update_user(&self, id: Uuid, input: UpdateUser) -> AppResult<User> {
        if input.is_empty() {
            return self.get_user(id).await;
        }

        let email = input.email.as_deref().map(normalize_email);
        self.check_unique(input.username.as_deref(), email.as_deref(), Some(id))
            .await?;

        let password_hash = input
            .password
            .as_deref()
            .map(Password::new)
            .transpose()?
            .map(Password::into_string);

        let user = self
            .repos
            .users()
            .update(
                id,
                UserChanges {
                    username: input.username,
                    email,
                    first_name: input.first_name,
                    last_name: input.last_name,
                    password_hash,
                },
            )
            .await?;

        tracing::info!(user_id = %user.id, "User updated");
        Ok(user.without_password())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::repositories::{MockTokenRepository, MockUserRepository};
    use crate::infra::{TokenRepository, UserRepository};
    use chrono::Utc;

    struct TestRepositories {
        users: Arc<MockUserRepository>,
        tokens: Arc<MockTokenRepository>,
    }

    impl Repositories for TestRepositories {
        fn users(&self) -> Arc<dyn UserRepository> {
            self.users.clone()
        }

        fn tokens(&self) -> Arc<dyn TokenRepository> {
            self.tokens.clone()
        }
    }

    fn service(users: MockUserRepository) -> UserManager<TestRepositories> {
        UserManager::new(Arc::new(TestRepositories {
            users: Arc::new(users),
            tokens: Arc::new(MockTokenRepository::new()),
        }))
    }

    fn stored_user(id: Uuid, username: &str, email: &str, password_hash: String) -> User {
        User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            first_name: "test_f_name001".to_string(),
            last_name: "test_l_name001".to_string(),
            password_hash,
            is_active: true,
            date_joined: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn registration() -> CreateUser {
        CreateUser {
            username: "testuser1".to_string(),
            email: "test001@EXAMPLE.com".to_string(),
            first_name: "test_f_name001".to_string(),
            last_name: "test_l_name001".to_string(),
            password: "testpass001".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_user_hashes_password_and_clears_it() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username().returning(|_| Ok(None));
        repo.expect_find_by_email().returning(|_| Ok(None));
        repo.expect_create()
            .withf(|new_user: &NewUser| {
                new_user.email == "test001@example.com"
                    && new_user.password_hash != "testpass001"
                    && Password::from_hash(new_user.password_hash.clone()).verify("testpass001")
            })
            .times(1)
            .returning(|new_user| {
                Ok(stored_user(
                    Uuid::new_v4(),
                    &new_user.username,
                    &new_user.email,
                    new_user.password_hash,
                ))
            });

        let user = service(repo).create_user(registration()).await.unwrap();

        assert_eq!(user.username, "testuser1");
        assert_eq!(user.email, "test001@example.com");
        assert!(user.password_hash.is_empty());
    }

    #[tokio::test]
    async fn test_create_user_reports_every_conflict() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username()
            .returning(|username| Ok(Some(stored_user(Uuid::new_v4(), username, "a@b.c", String::new()))));
        repo.expect_find_by_email()
            .returning(|email| Ok(Some(stored_user(Uuid::new_v4(), "other", email, String::new()))));
        repo.expect_create().never();

        match service(repo).create_user(registration()).await {
            Err(AppError::Validation(fields)) => {
                assert_eq!(fields.get("username").unwrap(), [MSG_USERNAME_TAKEN]);
                assert_eq!(fields.get("email").unwrap(), [MSG_EMAIL_TAKEN]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_user_rejects_short_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username().returning(|_| Ok(None));
        repo.expect_find_by_email().returning(|_| Ok(None));
        repo.expect_create().never();

        let input = CreateUser {
            password: "short".to_string(),
            ..registration()
        };

        let result = service(repo).create_user(input).await;
        assert!(matches!(result, Err(AppError::Validation(f)) if f.contains("password")));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let result = service(repo).get_user(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_get_user_clears_hash() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(stored_user(id, "testuser1", "a@b.c", "$argon2id$...".to_string()))));

        let user = service(repo).get_user(Uuid::new_v4()).await.unwrap();
        assert!(user.password_hash.is_empty());
    }

    #[tokio::test]
    async fn test_update_user_allows_keeping_own_email() {
        let id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(move |email| Ok(Some(stored_user(id, "testuser1", email, String::new()))));
        repo.expect_update()
            .withf(move |target, changes| {
                *target == id
                    && changes.email.as_deref() == Some("test001@example.com")
                    && changes.password_hash.is_none()
            })
            .times(1)
            .returning(|id, changes| {
                Ok(stored_user(id, "testuser1", &changes.email.unwrap(), "hash".to_string()))
            });

        let update = UpdateUser {
            email: Some("test001@Example.COM".to_string()),
            ..Default::default()
        };

        let user = service(repo).update_user(id, update).await.unwrap();
        assert_eq!(user.email, "test001@example.com");
        assert!(user.password_hash.is_empty());
    }

    #[tokio::test]
    async fn test_update_user_rejects_taken_username() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username()
            .returning(|username| Ok(Some(stored_user(Uuid::new_v4(), username, "x@y.z", String::new()))));
        repo.expect_update().never();

        let update = UpdateUser {
            username: Some("someoneelse".to_string()),
            ..Default::default()
        };

        let result = service(repo).update_user(Uuid::new_v4(), update).await;
        assert!(matches!(result, Err(AppError::Validation(f)) if f.contains("username")));
    }

    #[tokio::test]
    async fn test_update_user_rehashes_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_update()
            .withf(|_, changes| {
                changes
                    .password_hash
                    .as_ref()
                    .is_some_and(|h| Password::from_hash(h.clone()).verify("newpass123"))
            })
            .times(1)
            .returning(|id, _| Ok(stored_user(id, "testuser1", "a@b.c", "hash".to_string())));

        let update = UpdateUser {
            password: Some("newpass123".to_string()),
            ..Default::default()
        };

        assert!(service(repo).update_user(Uuid::new_v4(), update).await.is_ok());
    }

    #[tokio::test]
    async fn test_empty_update_reads_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_update().never();
        repo.expect_find_by_id()
            .times(1)
            .returning(|id| Ok(Some(stored_user(id, "testuser1", "a@b.c", "hash".to_string()))));

        let user = service(repo)
            .update_user(Uuid::new_v4(), UpdateUser::default())
            .await
            .unwrap();
        assert_eq!(user.username, "testuser1");
    }
}
