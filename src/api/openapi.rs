//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{token_handler, user_handler};
use crate::domain::{TokenResponse, UserResponse};

/// OpenAPI documentation for the User API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User API",
        version = "0.1.0",
        description = "User registration and token authentication"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // User endpoints
        user_handler::create_user,
        user_handler::get_current_user,
        user_handler::update_current_user,
        // Authentication endpoints
        token_handler::create_token,
    ),
    components(
        schemas(
            UserResponse,
            TokenResponse,
            user_handler::CreateUserRequest,
            user_handler::UpdateUserRequest,
            token_handler::TokenRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Account registration and profile"),
        (name = "Authentication", description = "Token issuance")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for `Authorization: Token <key>`
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token_auth",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "Token obtained from /api/token/, sent as `Token <key>`",
                ))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_endpoint() {
        let doc = ApiDoc::openapi();
        for path in ["/api/createuser/", "/api/token/", "/api/me/"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
