//! Driving port for the subscription dashboard.

use async_trait::async_trait;

use crate::domain::{Error, Subscription, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionQuery: Send + Sync {
    /// Subscriptions owned by `user_id`, ordered by city name.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Subscription>, Error>;
}
