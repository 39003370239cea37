//! Driving ports for account registration and user lookups.

use async_trait::async_trait;

use crate::domain::{AuthenticatedUser, Error, PasswordChange, Registration, User, UserId};

/// Account mutations.
#[async_trait]
pub trait UserAccountCommand: Send + Sync {
    /// Create a member account. Duplicate emails or usernames are conflicts.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Replace the caller's password after checking the current one.
    async fn change_password(
        &self,
        caller: &AuthenticatedUser,
        change: PasswordChange,
    ) -> Result<(), Error>;
}

/// Account reads, authorised against the caller.
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Fetch a user; callers may read themselves, admins may read anyone.
    async fn get_user(&self, caller: &AuthenticatedUser, id: &UserId) -> Result<User, Error>;

    /// List all users. Admin only.
    async fn list_users(&self, caller: &AuthenticatedUser) -> Result<Vec<User>, Error>;
}
