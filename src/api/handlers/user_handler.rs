//! User account handlers: registration and the caller's own profile.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{CreateUser, UpdateUser, UserResponse, USERNAME_PATTERN};
use crate::errors::AppResult;

/// Registration request. Every key must be present; names may be blank.
#[derive(Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(
        required,
        length(min = 1, max = 150, message = "Ensure this field has 1 to 150 characters."),
        regex(
            path = *USERNAME_PATTERN,
            message = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
        )
    )]
    #[schema(example = "testuser1", max_length = 150)]
    pub username: Option<String>,
    #[validate(
        required,
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this field has no more than 254 characters.")
    )]
    #[schema(example = "test001@example.com")]
    pub email: Option<String>,
    /// Write-only; never echoed back
    #[validate(
        required,
        length(min = 8, message = "Ensure this field has at least 8 characters.")
    )]
    #[schema(example = "testpass001", min_length = 8, write_only)]
    pub password: Option<String>,
    #[validate(
        required,
        length(max = 150, message = "Ensure this field has no more than 150 characters.")
    )]
    #[schema(example = "Jane")]
    pub first_name: Option<String>,
    #[validate(
        required,
        length(max = 150, message = "Ensure this field has no more than 150 characters.")
    )]
    #[schema(example = "Doe")]
    pub last_name: Option<String>,
}

impl From<CreateUserRequest> for CreateUser {
    fn from(request: CreateUserRequest) -> Self {
        Self {
            username: request.username.unwrap_or_default(),
            email: request.email.unwrap_or_default(),
            first_name: request.first_name.unwrap_or_default(),
            last_name: request.last_name.unwrap_or_default(),
            password: request.password.unwrap_or_default(),
        }
    }
}

/// Partial profile update. Absent keys are left unchanged.
#[derive(Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(
        length(min = 1, max = 150, message = "Ensure this field has 1 to 150 characters."),
        regex(
            path = *USERNAME_PATTERN,
            message = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
        )
    )]
    #[schema(example = "testuser2")]
    pub username: Option<String>,
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this field has no more than 254 characters.")
    )]
    #[schema(example = "test002@example.com")]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "Ensure this field has at least 8 characters."))]
    #[schema(min_length = 8, write_only)]
    pub password: Option<String>,
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub last_name: Option<String>,
}

impl From<UpdateUserRequest> for UpdateUser {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            username: request.username,
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
            password: request.password,
        }
    }
}

/// Public registration route
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/createuser/", post(create_user))
}

/// Routes for the authenticated caller's own account
pub fn account_routes() -> Router<AppState> {
    Router::new().route("/me/", get(get_current_user).patch(update_current_user))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/createuser/",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Missing, invalid or already used fields")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state.user_service.create_user(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Get current authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/me/",
    tag = "Users",
    security(("token_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn get_current_user(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

/// Update current authenticated user's profile
#[utoipa::path(
    patch,
    path = "/api/me/",
    tag = "Users",
    security(("token_auth" = [])),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Invalid or already used fields"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn update_current_user(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let updated = state
        .user_service
        .update_user(user.id, payload.into())
        .await?;

    Ok(Json(UserResponse::from(updated)))
}
