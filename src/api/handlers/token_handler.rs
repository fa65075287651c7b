//! Token issuance handler.

use axum::{extract::State, response::Json, routing::post, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::config::{MSG_IDENTIFIER_REQUIRED, NON_FIELD_ERRORS};
use crate::domain::TokenResponse;
use crate::errors::{AppError, AppResult};
use crate::services::{Credentials, LoginIdentifier};

/// Token request. Identify the account by `username` or by `email`.
#[derive(Deserialize, Validate, ToSchema)]
pub struct TokenRequest {
    #[schema(example = "testuser1")]
    pub username: Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    #[schema(example = "test001@example.com")]
    pub email: Option<String>,
    #[validate(required)]
    #[schema(example = "testpass001", write_only)]
    pub password: Option<String>,
}

impl TryFrom<TokenRequest> for Credentials {
    type Error = AppError;

    fn try_from(request: TokenRequest) -> Result<Self, Self::Error> {
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        // Username wins when both are sent.
        let identifier = match (non_blank(request.username), non_blank(request.email)) {
            (Some(username), _) => LoginIdentifier::Username(username),
            (None, Some(email)) => LoginIdentifier::Email(email),
            (None, None) => return Err(AppError::field(NON_FIELD_ERRORS, MSG_IDENTIFIER_REQUIRED)),
        };

        Ok(Credentials {
            identifier,
            password: request.password.unwrap_or_default(),
        })
    }
}

/// Create token routes
pub fn token_routes() -> Router<AppState> {
    Router::new().route("/token/", post(create_token))
}

/// Exchange credentials for the account's token
#[utoipa::path(
    post,
    path = "/api/token/",
    tag = "Authentication",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Missing fields or invalid credentials")
    )
)]
pub async fn create_token(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<TokenRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state.auth_service.obtain_token(payload.try_into()?).await?;

    Ok(Json(TokenResponse::from(token)))
}
