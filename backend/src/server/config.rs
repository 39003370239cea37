//! HTTP server configuration objects.

use std::net::SocketAddr;

use chrono::TimeDelta;
use communalert::outbound::crypto::JwtSecret;
use communalert::outbound::persistence::DbPool;

use super::settings::{AppSettings, SettingsError};

/// Token signing and cookie settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub(crate) jwt_secret: JwtSecret,
    pub(crate) token_ttl: TimeDelta,
    pub(crate) cookie_secure: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new(jwt_secret: JwtSecret, token_ttl: TimeDelta) -> Self {
        Self {
            jwt_secret,
            token_ttl,
            cookie_secure: true,
        }
    }

    /// Override the `Secure` attribute on the access token cookie.
    #[must_use]
    pub fn with_cookie_secure(mut self, cookie_secure: bool) -> Self {
        self.cookie_secure = cookie_secure;
        self
    }

    /// Derive the auth configuration from loaded settings.
    ///
    /// # Errors
    /// Propagates secret and lifetime validation failures.
    pub fn from_settings(settings: &AppSettings) -> Result<Self, SettingsError> {
        Ok(Self::new(settings.jwt_secret()?, settings.token_ttl()?)
            .with_cookie_secure(settings.cookie_secure()))
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) auth: AuthConfig,
    pub(crate) docs_enabled: bool,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool, auth: AuthConfig) -> Self {
        Self {
            bind_addr,
            db_pool,
            auth,
            docs_enabled: true,
        }
    }

    /// Toggle Swagger UI and the OpenAPI JSON endpoint.
    #[must_use]
    pub fn with_docs(mut self, enabled: bool) -> Self {
        self.docs_enabled = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn auth_config_defaults_to_secure_cookies() {
        let auth = AuthConfig::new(JwtSecret::generate(), TimeDelta::minutes(30));
        assert!(auth.cookie_secure);

        let relaxed = auth.with_cookie_secure(false);
        assert!(!relaxed.cookie_secure);
        assert_eq!(relaxed.token_ttl, TimeDelta::minutes(30));
    }
}
