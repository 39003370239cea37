//! Port abstraction for alert persistence adapters and their errors.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Alert, AlertFilter, AlertId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by alert repository adapters.
    pub enum AlertPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "alert repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "alert repository query failed: {message}",
        /// The owning user row does not exist.
        UnknownOwner => "alert owner does not exist",
    }
}

/// Storage for alerts. Soft-deleted rows are never returned or updated.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlertRepository: Send + Sync {
    /// Persist a newly created alert.
    async fn insert(&self, alert: &Alert) -> Result<(), AlertPersistenceError>;

    /// Fetch a live alert by identifier.
    async fn find_by_id(&self, id: &AlertId) -> Result<Option<Alert>, AlertPersistenceError>;

    /// List live alerts owned by `owner`, newest first.
    async fn list_for_owner(
        &self,
        owner: &UserId,
        filter: &AlertFilter,
    ) -> Result<Vec<Alert>, AlertPersistenceError>;

    /// Overwrite the mutable fields of a live alert. Returns `false` when no
    /// live row matched.
    async fn update(&self, alert: &Alert) -> Result<bool, AlertPersistenceError>;

    /// Mark a live alert as deleted. Returns `false` when no live row matched.
    async fn soft_delete(
        &self,
        id: &AlertId,
        deleted_at: DateTime<Utc>,
    ) -> Result<bool, AlertPersistenceError>;
}
