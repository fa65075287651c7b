//! User repository backed by SeaORM.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{NewUser, User, UserChanges};
use crate::errors::{AppError, AppResult};

#[cfg(test)]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by exact username
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Find user by (normalized) email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Insert a new user. Unique violations surface as field errors.
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    /// Apply column changes to an existing user.
    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(new_user.username),
            email: Set(new_user.email),
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            password_hash: Set(new_user.password_hash),
            is_active: Set(true),
            date_joined: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(AppError::from_user_write)?;
        Ok(User::from(model))
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User> {
        let user = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = user.into();

        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(password_hash) = changes.password_hash {
            active.password_hash = Set(password_hash);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active
            .update(&self.db)
            .await
            .map_err(AppError::from_user_write)?;
        Ok(User::from(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MSG_EMAIL_TAKEN, MSG_USERNAME_TAKEN};
    use crate::infra::Database;
    use sea_orm::ConnectOptions;

    async fn store() -> UserStore {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect_with(options).await.unwrap();
        db.run_migrations().await.unwrap();
        UserStore::new(db.get_connection())
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: "$argon2id$stub".to_string(),
        }
    }

    fn field_message(err: AppError, field: &str) -> String {
        match err {
            AppError::Validation(fields) => fields.get(field).unwrap()[0].clone(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = store().await;
        let created = store
            .create(new_user("testuser1", "test001@example.com"))
            .await
            .unwrap();

        let by_email = store.find_by_email("test001@example.com").await.unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(created.id));
        assert!(created.is_active);
    }

    #[tokio::test]
    async fn test_duplicate_email_insert_is_field_error() {
        let store = store().await;
        store
            .create(new_user("testuser1", "test001@example.com"))
            .await
            .unwrap();

        let err = store
            .create(new_user("testuser2", "test001@example.com"))
            .await
            .unwrap_err();
        assert_eq!(field_message(err, "email"), MSG_EMAIL_TAKEN);
    }

    #[tokio::test]
    async fn test_duplicate_username_insert_is_field_error() {
        let store = store().await;
        store
            .create(new_user("testuser1", "test001@example.com"))
            .await
            .unwrap();

        let err = store
            .create(new_user("testuser1", "test002@example.com"))
            .await
            .unwrap_err();
        assert_eq!(field_message(err, "username"), MSG_USERNAME_TAKEN);
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let store = store().await;
        let result = store.update(Uuid::new_v4(), UserChanges::default()).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
