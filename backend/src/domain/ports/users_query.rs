//! Driving port for user lookups made by handlers.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId, Username};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error>;

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, Error>;
}
