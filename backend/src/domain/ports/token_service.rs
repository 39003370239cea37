//! Driven port for issuing and validating signed access tokens.

use crate::domain::{IssuedToken, TokenClaims, User};

use super::define_port_error;

define_port_error! {
    /// Token failures. Every variant is an authentication failure for callers
    /// except [`TokenError::Signing`], which is a server fault.
    pub enum TokenError {
        /// The token's expiry has passed.
        Expired => "token has expired",
        /// The signature does not match the configured secret.
        InvalidSignature => "token signature is invalid",
        /// The token could not be decoded or lacks required claims.
        Malformed { message: String } => "token is malformed: {message}",
        /// A token could not be produced.
        Signing { message: String } => "token signing failed: {message}",
    }
}

impl TokenError {
    /// Machine-readable reason surfaced in error details.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Expired => "token_expired",
            Self::InvalidSignature => "invalid_signature",
            Self::Malformed { .. } => "malformed_token",
            Self::Signing { .. } => "token_signing_failed",
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Issue a token for `user`, valid for the configured lifetime.
    fn issue(&self, user: &User) -> Result<IssuedToken, TokenError>;

    /// Verify signature and expiry, returning the embedded claims.
    fn validate(&self, token: &str) -> Result<TokenClaims, TokenError>;
}
