//! Account domain service.
//!
//! Implements registration, login, bearer-token verification, user lookups,
//! and password changes over a [`UserRepository`], a [`PasswordHasher`], and
//! a [`TokenService`].

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    LoginService, PasswordHashError, PasswordHasher, TokenError, TokenService, TokenVerifier,
    UniqueUserField, UserAccountCommand, UserPersistenceError, UserRepository, UsersQuery,
};
use crate::domain::{
    AuthenticatedUser, Error, LoginCredentials, LoginOutcome, PasswordChange, PasswordHash,
    PlainPassword, Registration, Role, User, UserAccount, UserId, stored_instant,
};

/// Verified against on unknown-email logins so both failure paths pay for
/// a password verification.
const DECOY_PASSWORD: &str = "communalert-decoy-password";

fn map_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Duplicate { field } => {
            Error::conflict(format!("{field} already in use")).with_details(json!({
                "field": field.to_string(),
                "code": "duplicate_user",
            }))
        }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

fn map_token_error(error: TokenError) -> Error {
    match error {
        TokenError::Signing { .. } => Error::internal(error.to_string()),
        _ => Error::unauthorized(error.to_string())
            .with_details(json!({ "code": error.reason() })),
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

/// Account service implementing the login and user-account driving ports.
#[derive(Clone)]
pub struct AccountService<U> {
    users: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    clock: Arc<dyn Clock>,
    decoy: Arc<OnceLock<PasswordHash>>,
}

impl<U> AccountService<U> {
    /// Create a new service from its collaborators.
    pub fn new(
        users: Arc<U>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
            decoy: Arc::new(OnceLock::new()),
        }
    }

    /// Hash of [`DECOY_PASSWORD`], computed on first use.
    async fn decoy_hash(&self) -> Result<PasswordHash, Error> {
        if let Some(hash) = self.decoy.get() {
            return Ok(hash.clone());
        }
        let password = PlainPassword::new(DECOY_PASSWORD)
            .map_err(|err| Error::internal(err.to_string()))?;
        let hash = self.hasher.hash(&password).await.map_err(map_hash_error)?;
        Ok(self.decoy.get_or_init(|| hash).clone())
    }

    /// Spend a verification on an account that does not exist.
    async fn verify_against_decoy(&self, credentials: &LoginCredentials) {
        let outcome = match self.decoy_hash().await {
            Ok(hash) => self
                .hasher
                .verify(credentials.password(), &hash)
                .await
                .map(|_| ())
                .map_err(map_hash_error),
            Err(err) => Err(err),
        };
        if let Err(err) = outcome {
            debug!(error = %err, "decoy password verification failed");
        }
    }
}

impl<U> AccountService<U>
where
    U: UserRepository,
{
    async fn load_account(&self, id: &UserId) -> Result<Option<UserAccount>, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_repository_error)
    }
}

#[async_trait]
impl<U> LoginService for AccountService<U>
where
    U: UserRepository,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error> {
        let Some(account) = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_repository_error)?
        else {
            debug!("login attempted for unknown email");
            self.verify_against_decoy(credentials).await;
            return Err(invalid_credentials());
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &account.password_hash)
            .await
            .map_err(map_hash_error)?;
        if !matches {
            debug!(user_id = %account.user.id, "login rejected: wrong password");
            return Err(invalid_credentials());
        }
        if !account.user.is_active {
            warn!(user_id = %account.user.id, "login rejected: account disabled");
            return Err(Error::forbidden("account is disabled"));
        }

        let token = self.tokens.issue(&account.user).map_err(map_token_error)?;
        info!(user_id = %account.user.id, "user logged in");
        Ok(LoginOutcome {
            user: account.user,
            token,
        })
    }
}

#[async_trait]
impl<U> TokenVerifier for AccountService<U>
where
    U: UserRepository,
{
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, Error> {
        let claims = self.tokens.validate(token).map_err(map_token_error)?;
        let account = self.load_account(&claims.subject).await?.ok_or_else(|| {
            Error::unauthorized("token subject no longer exists")
                .with_details(json!({ "code": "unknown_subject" }))
        })?;
        if !account.user.is_active {
            return Err(Error::unauthorized("account is disabled")
                .with_details(json!({ "code": "account_disabled" })));
        }

        // Role is read from storage so demotions take effect before expiry.
        Ok(AuthenticatedUser {
            id: account.user.id,
            role: account.user.role,
        })
    }
}

#[async_trait]
impl<U> UserAccountCommand for AccountService<U>
where
    U: UserRepository,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let existing = self
            .users
            .find_by_email(registration.email.as_ref())
            .await
            .map_err(map_repository_error)?;
        if existing.is_some() {
            return Err(map_repository_error(UserPersistenceError::duplicate(
                UniqueUserField::Email,
            )));
        }

        let password_hash = self
            .hasher
            .hash(&registration.password)
            .await
            .map_err(map_hash_error)?;
        let now = stored_instant(self.clock.utc());
        let user = User {
            id: UserId::random(),
            username: registration.username,
            email: registration.email,
            first_name: registration.first_name,
            last_name: registration.last_name,
            role: Role::Member,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.users
            .insert(&user, &password_hash)
            .await
            .map_err(map_repository_error)?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    async fn change_password(
        &self,
        caller: &AuthenticatedUser,
        change: PasswordChange,
    ) -> Result<(), Error> {
        let account = self
            .load_account(&caller.id)
            .await?
            .ok_or_else(|| Error::unauthorized("authenticated account no longer exists"))?;

        let matches = self
            .hasher
            .verify(&change.current, &account.password_hash)
            .await
            .map_err(map_hash_error)?;
        if !matches {
            return Err(Error::invalid_request("current password is incorrect")
                .with_details(json!({ "field": "currentPassword", "code": "wrong_password" })));
        }

        let replacement = self
            .hasher
            .hash(&change.replacement)
            .await
            .map_err(map_hash_error)?;
        let updated = self
            .users
            .update_password(&caller.id, &replacement, stored_instant(self.clock.utc()))
            .await
            .map_err(map_repository_error)?;
        if !updated {
            return Err(Error::unauthorized("authenticated account no longer exists"));
        }
        info!(user_id = %caller.id, "password changed");
        Ok(())
    }
}

#[async_trait]
impl<U> UsersQuery for AccountService<U>
where
    U: UserRepository,
{
    async fn get_user(&self, caller: &AuthenticatedUser, id: &UserId) -> Result<User, Error> {
        if !caller.may_act_for(id) {
            return Err(Error::forbidden("users may only view their own profile"));
        }
        self.load_account(id)
            .await?
            .map(|account| account.user)
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }

    async fn list_users(&self, caller: &AuthenticatedUser) -> Result<Vec<User>, Error> {
        if !caller.is_admin() {
            return Err(Error::forbidden("listing users requires the admin role"));
        }
        self.users.list().await.map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
