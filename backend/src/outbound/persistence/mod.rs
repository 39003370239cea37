//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories implement the domain's driven ports over `diesel-async`
//! connections checked out of a `bb8` pool. Row structs (`models.rs`) and
//! table definitions (`schema.rs`) stay private to this module; callers only
//! ever see domain records.
//!
//! # Example
//!
//! ```ignore
//! use communalert::outbound::persistence::{DbPool, DieselAlertRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/communalert")).await?;
//! let alerts = DieselAlertRepository::new(pool);
//! ```

mod diesel_alert_repository;
mod diesel_basic_error_mapping;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_alert_repository::DieselAlertRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
