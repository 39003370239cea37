//! Alert domain service.
//!
//! Implements the alert driving ports on top of an [`AlertRepository`].
//! Ownership is enforced here: a caller who neither owns an alert nor holds
//! the admin role sees the same `not_found` error as for a missing alert.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{AlertCommand, AlertPersistenceError, AlertQuery, AlertRepository};
use crate::domain::{
    Alert, AlertDraft, AlertFilter, AlertId, AlertPatch, AlertValidationError,
    AuthenticatedUser, Error, stored_instant,
};

fn map_repository_error(error: AlertPersistenceError) -> Error {
    match error {
        AlertPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("alert repository unavailable: {message}"))
        }
        AlertPersistenceError::Query { message } => {
            Error::internal(format!("alert repository error: {message}"))
        }
        AlertPersistenceError::UnknownOwner => {
            Error::unauthorized("authenticated account no longer exists")
        }
    }
}

fn alert_not_found(id: &AlertId) -> Error {
    Error::not_found(format!("alert {id} not found")).with_details(json!({
        "alertId": id.to_string(),
        "code": "alert_not_found",
    }))
}

fn map_patch_error(error: AlertValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({ "code": "empty_patch" }))
}

/// Alert service implementing [`AlertCommand`] and [`AlertQuery`].
#[derive(Clone)]
pub struct AlertService<R> {
    alerts: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> AlertService<R> {
    /// Create a new service over the alert repository.
    pub fn new(alerts: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { alerts, clock }
    }
}

impl<R> AlertService<R>
where
    R: AlertRepository,
{
    /// Load an alert and confirm the caller may act on it.
    async fn load_authorised(
        &self,
        caller: &AuthenticatedUser,
        id: &AlertId,
    ) -> Result<Alert, Error> {
        let alert = self
            .alerts
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| alert_not_found(id))?;

        if !caller.may_act_for(&alert.owner) {
            debug!(alert_id = %id, caller = %caller.id, "caller does not own alert");
            return Err(alert_not_found(id));
        }
        Ok(alert)
    }
}

#[async_trait]
impl<R> AlertCommand for AlertService<R>
where
    R: AlertRepository,
{
    async fn create(&self, caller: &AuthenticatedUser, draft: AlertDraft) -> Result<Alert, Error> {
        let alert = draft.into_alert(caller.id, self.clock.utc());
        self.alerts
            .insert(&alert)
            .await
            .map_err(map_repository_error)?;
        info!(alert_id = %alert.id, owner = %alert.owner, "alert created");
        Ok(alert)
    }

    async fn update(
        &self,
        caller: &AuthenticatedUser,
        id: &AlertId,
        patch: AlertPatch,
    ) -> Result<Alert, Error> {
        if patch.is_empty() {
            return Err(map_patch_error(AlertValidationError::EmptyPatch));
        }
        let current = self.load_authorised(caller, id).await?;
        let updated = patch
            .apply(current, self.clock.utc())
            .map_err(map_patch_error)?;

        let matched = self
            .alerts
            .update(&updated)
            .await
            .map_err(map_repository_error)?;
        if !matched {
            // Deleted between the read and the write.
            return Err(alert_not_found(id));
        }
        info!(alert_id = %id, caller = %caller.id, "alert updated");
        Ok(updated)
    }

    async fn delete(&self, caller: &AuthenticatedUser, id: &AlertId) -> Result<(), Error> {
        self.load_authorised(caller, id).await?;
        let matched = self
            .alerts
            .soft_delete(id, stored_instant(self.clock.utc()))
            .await
            .map_err(map_repository_error)?;
        if !matched {
            return Err(alert_not_found(id));
        }
        info!(alert_id = %id, caller = %caller.id, "alert deleted");
        Ok(())
    }
}

#[async_trait]
impl<R> AlertQuery for AlertService<R>
where
    R: AlertRepository,
{
    async fn get(&self, caller: &AuthenticatedUser, id: &AlertId) -> Result<Alert, Error> {
        self.load_authorised(caller, id).await
    }

    async fn list(
        &self,
        caller: &AuthenticatedUser,
        filter: AlertFilter,
    ) -> Result<Vec<Alert>, Error> {
        self.alerts
            .list_for_owner(&caller.id, &filter)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "alert_service_tests.rs"]
mod tests;
