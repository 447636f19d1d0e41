//! Account domain service: registration, login and user lookups.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{
    LoginService, PasswordHashError, PasswordHasher, RegistrationService, UserPersistenceError,
    UserRepository, UsersQuery,
};
use crate::domain::{
    Error, LoginCredentials, Registration, User, UserAccount, UserId, Username,
};

/// Account service implementing the login, registration and user query ports.
#[derive(Clone)]
pub struct AccountService<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
}

impl<U, H> AccountService<U, H> {
    /// Create a new service over a user repository and password hasher.
    pub fn new(users: Arc<U>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { username } => {
            Error::conflict(format!("username '{username}' is already taken"))
                .with_details(json!({ "field": "username", "code": "duplicate_username" }))
        }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

#[async_trait]
impl<U, H> LoginService for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Ok(username) = Username::new(credentials.username()) else {
            return Err(invalid_credentials());
        };
        let Some(account) = self
            .users
            .find_by_username(&username)
            .await
            .map_err(map_user_error)?
        else {
            debug!(%username, "login for unknown user");
            return Err(invalid_credentials());
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &account.password_hash)
            .map_err(map_hash_error)?;
        if !matches || !account.user.is_active {
            debug!(%username, active = account.user.is_active, "login rejected");
            return Err(invalid_credentials());
        }
        Ok(account.user)
    }
}

#[async_trait]
impl<U, H> RegistrationService for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn register(&self, registration: &Registration) -> Result<User, Error> {
        let password_hash = self
            .hasher
            .hash(registration.password())
            .map_err(map_hash_error)?;
        let account = UserAccount {
            user: User {
                id: UserId::random(),
                username: registration.username().clone(),
                email: registration.email().clone(),
                is_active: true,
            },
            password_hash,
        };
        self.users.insert(&account).await.map_err(map_user_error)?;
        info!(user_id = %account.user.id, username = %account.user.username, "user registered");
        Ok(account.user)
    }
}

#[async_trait]
impl<U, H> UsersQuery for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.users.find_by_id(id).await.map_err(map_user_error)
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, Error> {
        let account = self
            .users
            .find_by_username(username)
            .await
            .map_err(map_user_error)?;
        Ok(account.map(|account| account.user))
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
