//! Token authentication middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::config::TOKEN_KEYWORD;
use crate::domain::User;
use crate::errors::AppError;

/// Authenticated account resolved from the request's token.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Token authentication middleware.
///
/// Reads `Authorization: Token <key>`, resolves the key to its active owner,
/// then injects the CurrentUser into the request extensions.
pub async fn token_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(token_key)
        .ok_or(AppError::Unauthorized)?;

    let user = state.auth_service.authenticate(&key).await?;
    tracing::debug!(user_id = %user.id, "Token authenticated");

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

/// Key part of a `Token <key>` header value. The keyword is matched
/// case-insensitively; the key must be a single word.
fn token_key(header: &str) -> Option<String> {
    let mut parts = header.split_whitespace();
    let keyword = parts.next()?;
    let key = parts.next()?;

    if !keyword.eq_ignore_ascii_case(TOKEN_KEYWORD) || parts.next().is_some() {
        return None;
    }
    Some(key.to_string())
}
