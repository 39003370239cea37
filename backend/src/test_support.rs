//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is compiled for unit tests and when the
//! `test-support` feature is enabled.

mod clock;
mod in_memory;

pub use clock::MutableClock;
pub use in_memory::{FixturePasswordHasher, InMemoryAlertRepository, InMemoryUserRepository};

/// Secret used by tests that exercise the real JWT adapter.
pub const TEST_JWT_SECRET: &[u8] = b"communalert-test-secret-0123456789abcdef";
