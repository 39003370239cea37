//! Driving ports for login and bearer-token authentication.
//!
//! Inbound adapters call these to authenticate without knowing the backing
//! infrastructure, so handler tests can substitute a test double.

use async_trait::async_trait;

use crate::domain::{AuthenticatedUser, Error, LoginCredentials, LoginOutcome};

/// Domain use-case port for credential login.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and issue an access token.
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error>;
}

/// Domain use-case port resolving a bearer token to a live account.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Validate `token` and confirm its subject still exists and is active.
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, Error>;
}
