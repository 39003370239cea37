//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper yields an `invalid_request` [`Error`] whose details carry the
//! offending `field` and a stable machine-readable `code`.

use serde_json::json;

use crate::domain::{
    AlertId, AlertValidationError, CredentialValidationError, Error, UserId, UserValidationError,
};

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            message: message.into(),
        }
    }

    fn with_code(self, code: &'static str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code,
        }))
    }

    fn with_value(self, code: &'static str, value: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value,
            "code": code,
        }))
    }
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("{name} must be a valid UUID"))
        .with_value("invalid_uuid", value)
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_alert_id(value: &str, field: FieldName) -> Result<AlertId, Error> {
    AlertId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

/// Map a user value-object failure onto `field`.
pub(crate) fn user_field_error(field: FieldName, error: UserValidationError) -> Error {
    let code = match error {
        UserValidationError::InvalidId => "invalid_uuid",
        UserValidationError::EmptyEmail => "empty_email",
        UserValidationError::EmailTooLong { .. } => "email_too_long",
        UserValidationError::InvalidEmail => "invalid_email",
        UserValidationError::UsernameTooShort { .. } => "username_too_short",
        UserValidationError::UsernameTooLong { .. } => "username_too_long",
        UserValidationError::UsernameInvalidCharacters => "invalid_username",
        UserValidationError::EmptyPersonName => "empty_name",
        UserValidationError::PersonNameTooLong { .. } => "name_too_long",
        UserValidationError::UnknownRole => "unknown_role",
    };
    ValidationError::new(field, error.to_string()).with_code(code)
}

/// Map an alert value-object failure onto `field`.
pub(crate) fn alert_field_error(field: FieldName, error: AlertValidationError) -> Error {
    let code = match error {
        AlertValidationError::InvalidId => "invalid_uuid",
        AlertValidationError::EmptyTitle => "empty_title",
        AlertValidationError::TitleTooLong { .. } => "title_too_long",
        AlertValidationError::EmptyDescription => "empty_description",
        AlertValidationError::NegativeAlertType => "negative_alert_type",
        AlertValidationError::EmptyPostalCode => "empty_postal_code",
        AlertValidationError::PostalCodeTooLong { .. } => "postal_code_too_long",
        AlertValidationError::PostalCodeInvalidCharacters => "invalid_postal_code",
        AlertValidationError::UnknownStatus => "unknown_status",
        AlertValidationError::EmptyPatch => "empty_patch",
    };
    ValidationError::new(field, error.to_string()).with_code(code)
}

/// Map a credential failure onto `field`.
pub(crate) fn credential_field_error(field: FieldName, error: CredentialValidationError) -> Error {
    let code = match error {
        CredentialValidationError::EmptyEmail => "empty_email",
        CredentialValidationError::EmptyPassword => "empty_password",
        CredentialValidationError::PasswordTooLong { .. } => "password_too_long",
    };
    ValidationError::new(field, error.to_string()).with_code(code)
}
