//! CommunAlert backend library.
//!
//! Hexagonal layout: `domain` holds entities, ports, and services;
//! `inbound::http` adapts Actix requests onto driving ports; `outbound`
//! implements driven ports with Diesel, Argon2, and JWT.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
