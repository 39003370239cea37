//! HS256 JWT adapter for the `TokenService` port.
//!
//! Tokens carry `sub` (user id), `role`, `iat`, and `exp`. Expiry is checked
//! against the injected [`Clock`] rather than the system time so the lifetime
//! can be exercised deterministically.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::ports::{TokenError, TokenService};
use crate::domain::{IssuedToken, Role, TokenClaims, User, UserId};

/// Shortest signing secret accepted for HS256.
pub const JWT_SECRET_MIN_BYTES: usize = 32;

const GENERATED_SECRET_BYTES: usize = 64;

/// Rejections raised when constructing a [`JwtSecret`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JwtSecretError {
    #[error("JWT secret must be at least {min} bytes, got {actual}")]
    TooShort { min: usize, actual: usize },
}

/// Symmetric signing secret, wiped from memory on drop.
#[derive(Clone)]
pub struct JwtSecret(Zeroizing<Vec<u8>>);

impl JwtSecret {
    /// Wrap configured secret bytes.
    ///
    /// # Errors
    /// Returns [`JwtSecretError::TooShort`] below [`JWT_SECRET_MIN_BYTES`].
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, JwtSecretError> {
        let bytes = Zeroizing::new(bytes.into());
        if bytes.len() < JWT_SECRET_MIN_BYTES {
            return Err(JwtSecretError::TooShort {
                min: JWT_SECRET_MIN_BYTES,
                actual: bytes.len(),
            });
        }
        Ok(Self(bytes))
    }

    /// Random secret for development runs; tokens die with the process.
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new(vec![0_u8; GENERATED_SECRET_BYTES]);
        OsRng.fill_bytes(bytes.as_mut_slice());
        Self(bytes)
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JwtSecret(<redacted>)")
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: String,
    iat: i64,
    exp: i64,
}

fn timestamp(seconds: i64, claim: &str) -> Result<DateTime<Utc>, TokenError> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| TokenError::malformed(format!("{claim} is out of range")))
}

impl Claims {
    fn into_domain(self) -> Result<TokenClaims, TokenError> {
        let subject = UserId::new(&self.sub)
            .map_err(|_| TokenError::malformed("sub is not a user id"))?;
        let role = self
            .role
            .parse::<Role>()
            .map_err(|_| TokenError::malformed("role is not recognised"))?;
        Ok(TokenClaims {
            subject,
            role,
            issued_at: timestamp(self.iat, "iat")?,
            expires_at: timestamp(self.exp, "exp")?,
        })
    }
}

fn map_decode_error(error: jsonwebtoken::errors::Error) -> TokenError {
    match error.kind() {
        ErrorKind::InvalidSignature => TokenError::invalid_signature(),
        ErrorKind::ExpiredSignature => TokenError::expired(),
        _ => TokenError::malformed(error.to_string()),
    }
}

/// Issues and validates HS256 access tokens with a fixed lifetime.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    pub fn new(secret: &JwtSecret, ttl: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            clock,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user: &User) -> Result<IssuedToken, TokenError> {
        let issued_at = self.clock.utc();
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::signing("token expiry is out of range"))?;
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role.as_str().to_owned(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| TokenError::signing(err.to_string()))?;
        Ok(IssuedToken {
            access_token: Zeroizing::new(token),
            expires_at,
            expires_in_seconds: self.ttl.num_seconds(),
        })
    }

    fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(map_decode_error)?;
        let claims = data.claims.into_domain()?;
        if self.clock.utc() >= claims.expires_at {
            return Err(TokenError::expired());
        }
        Ok(claims)
    }
}
