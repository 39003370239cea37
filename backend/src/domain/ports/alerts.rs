//! Driving ports for the alert resource.
//!
//! Every operation takes the authenticated caller so the service can enforce
//! ownership. Alerts the caller may not act on are reported as not found.

use async_trait::async_trait;

use crate::domain::{
    Alert, AlertDraft, AlertFilter, AlertId, AlertPatch, AuthenticatedUser, Error,
};

/// Alert mutations.
#[async_trait]
pub trait AlertCommand: Send + Sync {
    /// Create an alert owned by the caller.
    async fn create(&self, caller: &AuthenticatedUser, draft: AlertDraft) -> Result<Alert, Error>;

    /// Apply a partial update to an alert the caller may act on.
    async fn update(
        &self,
        caller: &AuthenticatedUser,
        id: &AlertId,
        patch: AlertPatch,
    ) -> Result<Alert, Error>;

    /// Soft-delete an alert the caller may act on.
    async fn delete(&self, caller: &AuthenticatedUser, id: &AlertId) -> Result<(), Error>;
}

/// Alert reads.
#[async_trait]
pub trait AlertQuery: Send + Sync {
    /// Fetch an alert the caller may act on.
    async fn get(&self, caller: &AuthenticatedUser, id: &AlertId) -> Result<Alert, Error>;

    /// List the caller's own alerts, newest first.
    async fn list(
        &self,
        caller: &AuthenticatedUser,
        filter: AlertFilter,
    ) -> Result<Vec<Alert>, Error>;
}
