//! Application settings loaded via OrthoConfig.
//!
//! Values merge from CLI flags, `COMMUNALERT_*` environment variables, and an
//! optional configuration file. Unset values fall back to the defaults below.

use std::ffi::OsString;
use std::fmt;
use std::net::SocketAddr;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;

use communalert::outbound::crypto::{JwtSecret, JwtSecretError};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
/// One year; longer lifetimes push `exp` towards the edge of the calendar.
const MAX_TOKEN_TTL_MINUTES: i64 = 525_600;

/// Settings that cannot be turned into a runnable configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(String),
    #[error("COMMUNALERT_DATABASE_URL must be set")]
    MissingDatabaseUrl,
    #[error(
        "COMMUNALERT_JWT_SECRET must be set (or COMMUNALERT_ALLOW_EPHEMERAL_SECRET for development)"
    )]
    MissingJwtSecret,
    #[error("invalid JWT secret: {0}")]
    WeakJwtSecret(#[from] JwtSecretError),
    #[error("invalid bind address {value:?}: {message}")]
    InvalidBindAddr { value: String, message: String },
    #[error("token lifetime must be between 1 and 525600 minutes, got {0}")]
    InvalidTokenTtl(i64),
}

/// Configuration values controlling the HTTP server and its adapters.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "COMMUNALERT")]
pub struct AppSettings {
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// HS256 signing secret, at least 32 bytes.
    pub jwt_secret: Option<String>,
    /// Generate a throwaway signing secret when none is configured.
    #[ortho_config(default = false)]
    pub allow_ephemeral_secret: bool,
    /// Access token lifetime in minutes.
    pub token_ttl_minutes: Option<i64>,
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Mark the access token cookie `Secure`.
    pub cookie_secure: Option<bool>,
    /// Serve Swagger UI and the OpenAPI document.
    pub docs_enabled: Option<bool>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Apply pending migrations before serving.
    pub run_migrations: Option<bool>,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("allow_ephemeral_secret", &self.allow_ephemeral_secret)
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("bind_addr", &self.bind_addr)
            .field("cookie_secure", &self.cookie_secure)
            .field("docs_enabled", &self.docs_enabled)
            .field("db_max_connections", &self.db_max_connections)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

/// Resolve the signing secret, generating one only when permitted.
fn resolve_jwt_secret(
    configured: Option<&str>,
    allow_ephemeral: bool,
) -> Result<JwtSecret, SettingsError> {
    match configured.filter(|secret| !secret.is_empty()) {
        Some(secret) => Ok(JwtSecret::new(secret.as_bytes().to_vec())?),
        None if allow_ephemeral => {
            warn!("using an ephemeral JWT secret; tokens will not survive a restart");
            Ok(JwtSecret::generate())
        }
        None => Err(SettingsError::MissingJwtSecret),
    }
}

impl AppSettings {
    /// Merge defaults, the configuration file, environment and `args`.
    ///
    /// # Errors
    /// Returns [`SettingsError::Load`] when a source cannot be parsed.
    pub fn from_args(args: impl IntoIterator<Item = OsString>) -> Result<Self, SettingsError> {
        let args: Vec<OsString> = args.into_iter().collect();
        Self::load_from_iter(args).map_err(|err| SettingsError::Load(err.to_string()))
    }

    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Signing secret; debug builds may fall back to an ephemeral one.
    pub fn jwt_secret(&self) -> Result<JwtSecret, SettingsError> {
        resolve_jwt_secret(
            self.jwt_secret.as_deref(),
            cfg!(debug_assertions) || self.allow_ephemeral_secret,
        )
    }

    pub fn token_ttl(&self) -> Result<TimeDelta, SettingsError> {
        let minutes = self.token_ttl_minutes.unwrap_or(DEFAULT_TOKEN_TTL_MINUTES);
        match TimeDelta::try_minutes(minutes) {
            Some(ttl) if (1..=MAX_TOKEN_TTL_MINUTES).contains(&minutes) => Ok(ttl),
            _ => Err(SettingsError::InvalidTokenTtl(minutes)),
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value
            .parse()
            .map_err(|err: std::net::AddrParseError| SettingsError::InvalidBindAddr {
                value: value.to_owned(),
                message: err.to_string(),
            })
    }

    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    pub fn docs_enabled(&self) -> bool {
        self.docs_enabled.unwrap_or(true)
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
            .max(1)
    }

    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and defaults.

    use super::*;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 9] = [
        "COMMUNALERT_DATABASE_URL",
        "COMMUNALERT_JWT_SECRET",
        "COMMUNALERT_ALLOW_EPHEMERAL_SECRET",
        "COMMUNALERT_TOKEN_TTL_MINUTES",
        "COMMUNALERT_BIND_ADDR",
        "COMMUNALERT_COOKIE_SECURE",
        "COMMUNALERT_DOCS_ENABLED",
        "COMMUNALERT_DB_MAX_CONNECTIONS",
        "COMMUNALERT_RUN_MIGRATIONS",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::from_args([OsString::from("communalert")]).expect("config should load")
    }

    /// Every known variable, unset unless listed in `overrides`.
    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();
        assert_eq!(settings.database_url(), Err(SettingsError::MissingDatabaseUrl));
        assert_eq!(settings.token_ttl(), Ok(TimeDelta::minutes(30)));
        assert_eq!(
            settings.bind_addr(),
            Ok("0.0.0.0:8080".parse().expect("socket address"))
        );
        assert!(settings.cookie_secure());
        assert!(settings.docs_enabled());
        assert!(settings.run_migrations());
        assert_eq!(settings.db_max_connections(), 10);
        assert!(!settings.allow_ephemeral_secret);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("COMMUNALERT_DATABASE_URL", "postgres://app@db/communalert"),
            ("COMMUNALERT_TOKEN_TTL_MINUTES", "15"),
            ("COMMUNALERT_BIND_ADDR", "127.0.0.1:9000"),
            ("COMMUNALERT_COOKIE_SECURE", "false"),
            ("COMMUNALERT_DOCS_ENABLED", "false"),
            ("COMMUNALERT_DB_MAX_CONNECTIONS", "4"),
            ("COMMUNALERT_RUN_MIGRATIONS", "false"),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(settings.database_url(), Ok("postgres://app@db/communalert"));
        assert_eq!(settings.token_ttl(), Ok(TimeDelta::minutes(15)));
        assert_eq!(
            settings.bind_addr(),
            Ok("127.0.0.1:9000".parse().expect("socket address"))
        );
        assert!(!settings.cookie_secure());
        assert!(!settings.docs_enabled());
        assert!(!settings.run_migrations());
        assert_eq!(settings.db_max_connections(), 4);
    }

    #[rstest]
    fn debug_output_redacts_secrets() {
        let _guard = lock_env(env_with(&[
            (
                "COMMUNALERT_DATABASE_URL",
                "postgres://app:hunter2@db/communalert",
            ),
            ("COMMUNALERT_JWT_SECRET", "0123456789abcdef0123456789abcdef"),
        ]));

        let rendered = format!("{:?}", load_from_empty_args());
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("0123456789abcdef"));
    }

    #[rstest]
    #[case(0)]
    #[case(-5)]
    #[case(MAX_TOKEN_TTL_MINUTES + 1)]
    #[case(i64::MAX)]
    fn out_of_range_token_lifetimes_are_rejected(#[case] minutes: i64) {
        let _guard = lock_env(env_with(&[]));
        let settings = AppSettings {
            token_ttl_minutes: Some(minutes),
            ..load_from_empty_args()
        };

        assert_eq!(settings.token_ttl(), Err(SettingsError::InvalidTokenTtl(minutes)));
    }

    #[rstest]
    fn year_long_token_lifetime_is_accepted() {
        let _guard = lock_env(env_with(&[]));
        let settings = AppSettings {
            token_ttl_minutes: Some(MAX_TOKEN_TTL_MINUTES),
            ..load_from_empty_args()
        };

        assert_eq!(settings.token_ttl(), Ok(TimeDelta::days(365)));
    }

    #[rstest]
    fn unknown_flags_surface_as_load_errors() {
        let _guard = lock_env(env_with(&[]));

        let outcome = AppSettings::from_args([
            OsString::from("communalert"),
            OsString::from("--no-such-setting"),
        ]);
        assert!(matches!(outcome, Err(SettingsError::Load(_))));
    }

    #[rstest]
    fn malformed_bind_address_is_reported() {
        let _guard = lock_env(env_with(&[]));
        let settings = AppSettings {
            bind_addr: Some("localhost".to_owned()),
            ..load_from_empty_args()
        };

        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::InvalidBindAddr { .. })
        ));
    }

    #[rstest]
    fn configured_secret_must_be_long_enough() {
        let error = resolve_jwt_secret(Some("short"), true).expect_err("weak secret");
        assert!(matches!(error, SettingsError::WeakJwtSecret(_)));
    }

    #[rstest]
    fn missing_secret_requires_ephemeral_opt_in() {
        assert!(matches!(
            resolve_jwt_secret(None, false),
            Err(SettingsError::MissingJwtSecret)
        ));
        assert!(resolve_jwt_secret(Some(""), true).is_ok());
        assert!(resolve_jwt_secret(Some("0123456789abcdef0123456789abcdef"), false).is_ok());
    }
}
