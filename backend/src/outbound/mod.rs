//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel, plus embedded
//!   schema migrations.
//! - **crypto**: Argon2 password hashing and JWT access tokens.
//!
//! Adapters are thin translators between domain types and their storage or
//! wire representations. They contain no business logic.

pub mod crypto;
pub mod persistence;
