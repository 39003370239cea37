//! In-memory driven-port adapters.
//!
//! These mirror the constraints the PostgreSQL schema enforces (unique email
//! and username, soft-delete visibility, newest-first listing) so HTTP and
//! service tests can run without a database.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    AlertPersistenceError, AlertRepository, PasswordHashError, PasswordHasher, UniqueUserField,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Alert, AlertFilter, AlertId, PasswordHash, PlainPassword, Role, User, UserAccount, UserId,
};

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("{name} mutex poisoned"),
    }
}

/// User repository backed by a vector.
#[derive(Default)]
pub struct InMemoryUserRepository {
    accounts: Mutex<Vec<UserAccount>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change a stored user's role, e.g. to seed an administrator.
    pub fn set_role(&self, id: &UserId, role: Role) {
        let mut accounts = lock(&self.accounts, "user repository");
        if let Some(account) = accounts.iter_mut().find(|account| account.user.id == *id) {
            account.user.role = role;
        }
    }

    /// Enable or disable a stored user.
    pub fn set_active(&self, id: &UserId, is_active: bool) {
        let mut accounts = lock(&self.accounts, "user repository");
        if let Some(account) = accounts.iter_mut().find(|account| account.user.id == *id) {
            account.user.is_active = is_active;
        }
    }

    /// Whether a user with `id` exists.
    pub fn contains(&self, id: &UserId) -> bool {
        lock(&self.accounts, "user repository")
            .iter()
            .any(|account| account.user.id == *id)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut accounts = lock(&self.accounts, "user repository");
        if accounts.iter().any(|account| account.user.email == user.email) {
            return Err(UserPersistenceError::duplicate(UniqueUserField::Email));
        }
        if user.username.is_some()
            && accounts
                .iter()
                .any(|account| account.user.username == user.username)
        {
            return Err(UserPersistenceError::duplicate(UniqueUserField::Username));
        }
        accounts.push(UserAccount {
            user: user.clone(),
            password_hash: password_hash.clone(),
        });
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserPersistenceError> {
        Ok(lock(&self.accounts, "user repository")
            .iter()
            .find(|account| account.user.id == *id)
            .cloned())
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        Ok(lock(&self.accounts, "user repository")
            .iter()
            .find(|account| account.user.email.as_ref() == email)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut users: Vec<User> = lock(&self.accounts, "user repository")
            .iter()
            .map(|account| account.user.clone())
            .collect();
        users.sort_by_key(|user| user.created_at);
        Ok(users)
    }

    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &PasswordHash,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, UserPersistenceError> {
        let mut accounts = lock(&self.accounts, "user repository");
        let Some(account) = accounts.iter_mut().find(|account| account.user.id == *id) else {
            return Ok(false);
        };
        account.password_hash = password_hash.clone();
        account.user.updated_at = updated_at;
        Ok(true)
    }
}

struct StoredAlert {
    alert: Alert,
    deleted_at: Option<DateTime<Utc>>,
}

impl StoredAlert {
    fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Alert repository backed by a vector, honouring soft deletes.
#[derive(Default)]
pub struct InMemoryAlertRepository {
    alerts: Mutex<Vec<StoredAlert>>,
}

impl InMemoryAlertRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows including soft-deleted ones.
    pub fn stored_len(&self) -> usize {
        lock(&self.alerts, "alert repository").len()
    }
}

#[async_trait]
impl AlertRepository for InMemoryAlertRepository {
    async fn insert(&self, alert: &Alert) -> Result<(), AlertPersistenceError> {
        lock(&self.alerts, "alert repository").push(StoredAlert {
            alert: alert.clone(),
            deleted_at: None,
        });
        Ok(())
    }

    async fn find_by_id(&self, id: &AlertId) -> Result<Option<Alert>, AlertPersistenceError> {
        Ok(lock(&self.alerts, "alert repository")
            .iter()
            .find(|stored| stored.is_live() && stored.alert.id == *id)
            .map(|stored| stored.alert.clone()))
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
        filter: &AlertFilter,
    ) -> Result<Vec<Alert>, AlertPersistenceError> {
        let mut alerts: Vec<Alert> = lock(&self.alerts, "alert repository")
            .iter()
            .filter(|stored| stored.is_live() && stored.alert.owner == *owner)
            .filter(|stored| filter.matches(&stored.alert))
            .map(|stored| stored.alert.clone())
            .collect();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(alerts)
    }

    async fn update(&self, alert: &Alert) -> Result<bool, AlertPersistenceError> {
        let mut alerts = lock(&self.alerts, "alert repository");
        let Some(stored) = alerts
            .iter_mut()
            .find(|stored| stored.is_live() && stored.alert.id == alert.id)
        else {
            return Ok(false);
        };
        stored.alert = alert.clone();
        Ok(true)
    }

    async fn soft_delete(
        &self,
        id: &AlertId,
        deleted_at: DateTime<Utc>,
    ) -> Result<bool, AlertPersistenceError> {
        let mut alerts = lock(&self.alerts, "alert repository");
        let Some(stored) = alerts
            .iter_mut()
            .find(|stored| stored.is_live() && stored.alert.id == *id)
        else {
            return Ok(false);
        };
        stored.deleted_at = Some(deleted_at);
        Ok(true)
    }
}

const FIXTURE_PREFIX: &str = "fixture$";

/// Reversible, instant password "hasher" for tests. Never use in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixturePasswordHasher;

#[async_trait]
impl PasswordHasher for FixturePasswordHasher {
    async fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, PasswordHashError> {
        Ok(PasswordHash::new(format!(
            "{FIXTURE_PREFIX}{}",
            password.expose()
        )))
    }

    async fn verify(
        &self,
        password: &PlainPassword,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHashError> {
        let stored = hash
            .as_str()
            .strip_prefix(FIXTURE_PREFIX)
            .ok_or_else(|| PasswordHashError::malformed_hash("missing fixture prefix"))?;
        Ok(stored == password.expose())
    }
}
