//! Port for subscription persistence.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Recipient, Subscription, SubscriptionId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by subscription repository adapters.
    pub enum SubscriptionPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "subscription repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "subscription repository query failed: {message}",
        /// The user already holds the maximum number of subscriptions.
        LimitReached { limit: usize } => "subscription limit of {limit} reached",
        /// The user is already subscribed to this city.
        Duplicate { city: String } => "already subscribed to {city}",
    }
}

/// An active subscription joined with the owner's contact details.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledSubscription {
    pub subscription: Subscription,
    pub recipient: Recipient,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert `subscription` if its owner holds fewer than `limit` rows.
    ///
    /// The count check and the insert happen atomically.
    async fn insert_within_limit(
        &self,
        subscription: &Subscription,
        limit: usize,
    ) -> Result<(), SubscriptionPersistenceError>;

    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, SubscriptionPersistenceError>;

    /// All subscriptions owned by `user_id`, ordered by city name.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Subscription>, SubscriptionPersistenceError>;

    /// Persist the mutable columns of `subscription`.
    async fn update(&self, subscription: &Subscription) -> Result<(), SubscriptionPersistenceError>;

    /// Delete a subscription; `false` when nothing matched.
    async fn delete(&self, id: &SubscriptionId) -> Result<bool, SubscriptionPersistenceError>;

    /// Active subscriptions, optionally narrowed to `next_message < due_before`.
    async fn list_active(
        &self,
        due_before: Option<DateTime<Utc>>,
    ) -> Result<Vec<ScheduledSubscription>, SubscriptionPersistenceError>;
}
