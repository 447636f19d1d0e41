//! Driving port for account registration.

use async_trait::async_trait;

use crate::domain::{Error, Registration, User};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Create an active account from a validated registration form.
    ///
    /// A taken username is reported as a `conflict`.
    async fn register(&self, registration: &Registration) -> Result<User, Error>;
}
