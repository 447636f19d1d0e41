//! Driving port for subscription mutations.
//!
//! Every operation takes the acting user so the implementation can enforce
//! ownership; touching someone else's subscription is `unauthorized`.

use async_trait::async_trait;

use crate::domain::{
    CityName, Error, Period, ReportField, ReportFlags, Subscription, SubscriptionId, UserId,
};

/// Input for [`SubscriptionCommand::create`].
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSubscriptionRequest {
    pub user_id: UserId,
    pub city: CityName,
    /// Falls back to the default period when absent.
    pub period: Option<Period>,
    pub flags: ReportFlags,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionCommand: Send + Sync {
    /// Subscribe a user to a city, geocoding it on first use.
    ///
    /// # Errors
    ///
    /// - `invalid_request` when the city is unknown or the user already holds
    ///   the maximum number of subscriptions.
    /// - `conflict` when the user already subscribes to the city.
    /// - `service_unavailable` when geocoding fails.
    async fn create(&self, request: CreateSubscriptionRequest) -> Result<Subscription, Error>;

    /// Flip one boolean attribute.
    async fn toggle(
        &self,
        user_id: &UserId,
        id: &SubscriptionId,
        field: ReportField,
    ) -> Result<Subscription, Error>;

    async fn change_period(
        &self,
        user_id: &UserId,
        id: &SubscriptionId,
        period: Period,
    ) -> Result<Subscription, Error>;

    async fn delete(&self, user_id: &UserId, id: &SubscriptionId) -> Result<(), Error>;
}
