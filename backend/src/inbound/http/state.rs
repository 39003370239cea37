//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AlertCommand, AlertQuery, LoginService, TokenVerifier, UserAccountCommand, UsersQuery,
};

/// Settings for the `access_token` cookie set at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthCookieSettings {
    /// Emit the `Secure` attribute. Disable only for local HTTP development.
    pub secure: bool,
}

impl Default for AuthCookieSettings {
    fn default() -> Self {
        Self { secure: true }
    }
}

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub tokens: Arc<dyn TokenVerifier>,
    pub accounts: Arc<dyn UserAccountCommand>,
    pub users: Arc<dyn UsersQuery>,
    pub alerts: Arc<dyn AlertCommand>,
    pub alerts_query: Arc<dyn AlertQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub tokens: Arc<dyn TokenVerifier>,
    pub accounts: Arc<dyn UserAccountCommand>,
    pub users: Arc<dyn UsersQuery>,
    pub alerts: Arc<dyn AlertCommand>,
    pub alerts_query: Arc<dyn AlertQuery>,
    pub cookie: AuthCookieSettings,
}

impl HttpState {
    /// Construct state from a ports bundle and cookie settings.
    pub fn new(ports: HttpStatePorts, cookie: AuthCookieSettings) -> Self {
        let HttpStatePorts {
            login,
            tokens,
            accounts,
            users,
            alerts,
            alerts_query,
        } = ports;
        Self {
            login,
            tokens,
            accounts,
            users,
            alerts,
            alerts_query,
            cookie,
        }
    }
}
