//! PostgreSQL-backed `AlertRepository` implementation using Diesel ORM.
//!
//! Deletion is soft: rows keep their data and gain a `deleted_at` stamp.
//! Every read and write filters on `deleted_at IS NULL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AlertPersistenceError, AlertRepository};
use crate::domain::{Alert, AlertFilter, AlertId, UserId};

use super::diesel_basic_error_mapping::{
    is_foreign_key_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{AlertRow, AlertUpdate, NewAlertRow};
use super::pool::{DbPool, PoolError};
use super::schema::alerts;

/// Diesel-backed implementation of the `AlertRepository` port.
#[derive(Clone)]
pub struct DieselAlertRepository {
    pool: DbPool,
}

impl DieselAlertRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AlertPersistenceError {
    map_basic_pool_error(error, AlertPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AlertPersistenceError {
    if is_foreign_key_violation(&error) {
        return AlertPersistenceError::unknown_owner();
    }
    map_basic_diesel_error(
        error,
        AlertPersistenceError::query,
        AlertPersistenceError::connection,
    )
}

fn row_to_alert(row: AlertRow) -> Result<Alert, AlertPersistenceError> {
    Alert::try_from(row).map_err(AlertPersistenceError::query)
}

#[async_trait]
impl AlertRepository for DieselAlertRepository {
    async fn insert(&self, alert: &Alert) -> Result<(), AlertPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(alerts::table)
            .values(&NewAlertRow::from(alert))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &AlertId) -> Result<Option<Alert>, AlertPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        alerts::table
            .filter(alerts::id.eq(id.as_uuid()))
            .filter(alerts::deleted_at.is_null())
            .select(AlertRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_alert)
            .transpose()
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
        filter: &AlertFilter,
    ) -> Result<Vec<Alert>, AlertPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = alerts::table
            .filter(alerts::user_id.eq(*owner.as_uuid()))
            .filter(alerts::deleted_at.is_null())
            .into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(alerts::status.eq(status.as_str()));
        }
        if let Some(alert_type) = filter.alert_type {
            query = query.filter(alerts::alert_type.eq(alert_type.value()));
        }

        let rows: Vec<AlertRow> = query
            .order((alerts::created_at.desc(), alerts::id.desc()))
            .select(AlertRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_alert).collect()
    }

    async fn update(&self, alert: &Alert) -> Result<bool, AlertPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            alerts::table
                .filter(alerts::id.eq(alert.id.as_uuid()))
                .filter(alerts::deleted_at.is_null()),
        )
        .set(&AlertUpdate::from(alert))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn soft_delete(
        &self,
        id: &AlertId,
        deleted_at: DateTime<Utc>,
    ) -> Result<bool, AlertPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            alerts::table
                .filter(alerts::id.eq(id.as_uuid()))
                .filter(alerts::deleted_at.is_null()),
        )
        .set((
            alerts::deleted_at.eq(Some(deleted_at)),
            alerts::updated_at.eq(deleted_at),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }
}
