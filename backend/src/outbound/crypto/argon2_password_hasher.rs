//! Argon2id-backed `PasswordHasher` adapter.

use std::sync::LazyLock;

use argon2::password_hash::{self, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier as _, Version};
use async_trait::async_trait;
use rand::rngs::OsRng;
use tokio::task::spawn_blocking;

use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::domain::{PasswordHash, PlainPassword};

static CONTEXT: LazyLock<Argon2<'static>> =
    LazyLock::new(|| Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::DEFAULT));

fn hash_blocking(password: &[u8]) -> Result<PasswordHash, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    CONTEXT
        .hash_password(password, &salt)
        .map(|hash| PasswordHash::new(hash.to_string()))
        .map_err(|err| PasswordHashError::hash(err.to_string()))
}

fn verify_blocking(password: &[u8], encoded: &str) -> Result<bool, PasswordHashError> {
    let parsed = password_hash::PasswordHash::new(encoded)
        .map_err(|err| PasswordHashError::malformed_hash(err.to_string()))?;
    match CONTEXT.verify_password(password, &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(PasswordHashError::hash(err.to_string())),
    }
}

/// Salted Argon2id hashing with the library's default cost parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, PasswordHashError> {
        let password = password.clone();
        spawn_blocking(move || hash_blocking(password.expose().as_bytes()))
            .await
            .map_err(|err| PasswordHashError::hash(format!("hashing task failed: {err}")))?
    }

    async fn verify(
        &self,
        password: &PlainPassword,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHashError> {
        let password = password.clone();
        let encoded = hash.as_str().to_owned();
        spawn_blocking(move || verify_blocking(password.expose().as_bytes(), &encoded))
            .await
            .map_err(|err| PasswordHashError::hash(format!("verification task failed: {err}")))?
    }
}
