//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`LoginService`, `TokenVerifier`, `UserAccountCommand`,
//! `UsersQuery`, `AlertCommand`, `AlertQuery`) are consumed by inbound
//! adapters. Driven ports (`UserRepository`, `AlertRepository`,
//! `PasswordHasher`, `TokenService`) are implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod alert_repository;
mod alerts;
mod login_service;
mod password_hasher;
mod token_service;
mod user_accounts;
mod user_repository;

#[cfg(test)]
pub use alert_repository::MockAlertRepository;
pub use alert_repository::{AlertPersistenceError, AlertRepository};
pub use alerts::{AlertCommand, AlertQuery};
pub use login_service::{LoginService, TokenVerifier};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenError, TokenService};
pub use user_accounts::{UserAccountCommand, UsersQuery};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UniqueUserField, UserPersistenceError, UserRepository};
