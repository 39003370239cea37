//! Credential and token adapters.
//!
//! - [`Argon2PasswordHasher`] implements the `PasswordHasher` port with
//!   Argon2id, running the CPU-heavy work on Tokio's blocking pool.
//! - [`JwtTokenService`] implements the `TokenService` port with HS256 JWTs.

mod argon2_password_hasher;
mod jwt_token_service;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use jwt_token_service::{JWT_SECRET_MIN_BYTES, JwtSecret, JwtSecretError, JwtTokenService};
