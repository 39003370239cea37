//! Domain primitives, services, and ports.
//!
//! Purpose: define strongly typed entities used by the API and persistence
//! layers, plus the services that implement the account and alert use-cases.
//! Nothing here depends on Actix or Diesel.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure taxonomy.
//! - User, UserId, EmailAddress, Username, PersonName, Role: accounts.
//! - Alert, AlertDraft, AlertPatch, AlertFilter and value types: alerts.
//! - LoginCredentials, Registration, PasswordChange, AuthenticatedUser and
//!   token types: authentication.
//! - AccountService, AlertService: driving port implementations.
//! - stored_instant: clamp instants to the precision the database keeps.

pub mod account_service;
pub mod alert;
pub mod alert_service;
pub mod auth;
pub mod error;
pub mod ports;
pub mod timestamp;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::alert::{
    Alert, AlertDescription, AlertDraft, AlertFilter, AlertId, AlertPatch, AlertStatus,
    AlertTitle, AlertType, AlertValidationError, PostalCode,
};
pub use self::alert_service::AlertService;
pub use self::auth::{
    AuthenticatedUser, CredentialValidationError, IssuedToken, LoginCredentials, LoginOutcome,
    PasswordChange, PasswordHash, PlainPassword, Registration, TokenClaims, UserAccount,
};
pub use self::error::{Error, ErrorCode};
pub use self::timestamp::stored_instant;
pub use self::trace_id::TraceId;
pub use self::user::{
    EmailAddress, PersonName, Role, User, UserId, UserValidationError, Username,
};

/// HTTP header name used to propagate trace identifiers.
pub const TRACE_ID_HEADER: &str = "trace-id";
