//! Validated JSON extractor - Combines deserialization with validation.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::config::{MSG_FIELD_REQUIRED, NON_FIELD_ERRORS};
use crate::errors::{AppError, FieldErrors};

/// Validated JSON extractor that automatically validates requests.
///
/// Validation failures are reported per field, so clients can show each
/// message next to the input that caused it.
///
/// # Example
///
/// ```rust,ignore
/// use serde::Deserialize;
/// use validator::Validate;
/// use user_api::api::extractors::ValidatedJson;
///
/// #[derive(Deserialize, Validate)]
/// struct SignupRequest {
///     #[validate(required, email)]
///     email: Option<String>,
/// }
///
/// async fn signup(ValidatedJson(payload): ValidatedJson<SignupRequest>) {
///     // payload is already validated
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;

        value
            .validate()
            .map_err(|e| AppError::Validation(field_errors(&e)))?;

        Ok(ValidatedJson(value))
    }
}

/// Collect validator output into per-field messages.
fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut fields = FieldErrors::new();

    for (field, errs) in errors.field_errors() {
        let field = field.to_string();
        let key = if field == "__all__" {
            NON_FIELD_ERRORS.to_string()
        } else {
            field
        };

        for e in errs.iter() {
            let message = match (&e.message, &*e.code) {
                (Some(message), _) => message.to_string(),
                (None, "required") => MSG_FIELD_REQUIRED.to_string(),
                (None, _) => format!("{} is invalid", key),
            };
            fields.add(key.clone(), message);
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Validate)]
    struct Probe {
        #[validate(required)]
        name: Option<String>,
        #[validate(length(min = 3, message = "Too short."))]
        code: Option<String>,
        #[validate(email)]
        email: Option<String>,
    }

    #[test]
    fn test_messages_are_keyed_by_field() {
        let probe = Probe {
            name: None,
            code: Some("ab".to_string()),
            email: Some("nope".to_string()),
        };
        let fields = field_errors(&probe.validate().unwrap_err());

        assert_eq!(fields.get("name").unwrap(), [MSG_FIELD_REQUIRED]);
        assert_eq!(fields.get("code").unwrap(), ["Too short."]);
        assert_eq!(fields.get("email").unwrap(), ["email is invalid"]);
    }

    #[test]
    fn test_valid_payload_has_no_errors() {
        let probe = Probe {
            name: Some("x".to_string()),
            code: None,
            email: Some("a@b.com".to_string()),
        };
        assert!(probe.validate().is_ok());
    }
}
