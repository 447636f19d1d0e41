//! Subscription domain service.
//!
//! Creates subscriptions (geocoding unseen cities on the way), applies
//! owner-checked mutations and lists a user's dashboard.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    CityPersistenceError, CityRepository, CreateSubscriptionRequest, Geocoder, GeocodingError,
    SubscriptionCommand, SubscriptionPersistenceError, SubscriptionQuery, SubscriptionRepository,
};
use crate::domain::{
    City, CityId, CityName, Error, Period, ReportField, SUBSCRIPTION_LIMIT, Subscription,
    SubscriptionId, UserId,
};

/// Subscription service implementing the command and query ports.
#[derive(Clone)]
pub struct SubscriptionService<S, C, G> {
    subscriptions: Arc<S>,
    cities: Arc<C>,
    geocoder: Arc<G>,
    clock: Arc<dyn Clock>,
}

impl<S, C, G> SubscriptionService<S, C, G> {
    /// Create a new service.
    pub fn new(
        subscriptions: Arc<S>,
        cities: Arc<C>,
        geocoder: Arc<G>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            subscriptions,
            cities,
            geocoder,
            clock,
        }
    }
}

fn map_subscription_error(error: SubscriptionPersistenceError) -> Error {
    match error {
        SubscriptionPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("subscription repository unavailable: {message}"))
        }
        SubscriptionPersistenceError::Query { message } => {
            Error::internal(format!("subscription repository error: {message}"))
        }
        SubscriptionPersistenceError::LimitReached { limit } => limit_reached(limit),
        SubscriptionPersistenceError::Duplicate { city } => {
            Error::conflict(format!("already subscribed to {city}"))
                .with_details(json!({ "field": "city", "code": "duplicate_subscription" }))
        }
    }
}

fn map_city_error(error: CityPersistenceError) -> Error {
    match error {
        CityPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("city repository unavailable: {message}"))
        }
        CityPersistenceError::Query { message } => {
            Error::internal(format!("city repository error: {message}"))
        }
    }
}

fn map_geocoding_error(error: GeocodingError) -> Error {
    Error::service_unavailable(format!("could not geocode city: {error}"))
}

fn limit_reached(limit: usize) -> Error {
    Error::invalid_request(format!("you may hold at most {limit} subscriptions"))
        .with_details(json!({ "code": "subscription_limit", "limit": limit }))
}

impl<S, C, G> SubscriptionService<S, C, G>
where
    S: SubscriptionRepository,
    C: CityRepository,
    G: Geocoder,
{
    /// Existing city row, or a freshly geocoded one.
    async fn resolve_city(&self, name: &CityName) -> Result<City, Error> {
        if let Some(city) = self
            .cities
            .find_by_name(name)
            .await
            .map_err(map_city_error)?
        {
            return Ok(city);
        }

        let coordinates = self
            .geocoder
            .locate(name)
            .await
            .map_err(|err| {
                warn!(city = %name, error = %err, "geocoding failed");
                map_geocoding_error(err)
            })?
            .ok_or_else(|| {
                Error::invalid_request(format!("city '{name}' was not found"))
                    .with_details(json!({ "field": "city", "code": "unknown_city" }))
            })?;

        let candidate = City {
            id: CityId::random(),
            name: name.clone(),
            coordinates,
        };
        let city = self
            .cities
            .insert_or_get(&candidate)
            .await
            .map_err(map_city_error)?;
        info!(city_id = %city.id, city = %city.name, "city geocoded");
        Ok(city)
    }

    /// Load a subscription the acting user owns.
    async fn owned(&self, user_id: &UserId, id: &SubscriptionId) -> Result<Subscription, Error> {
        let subscription = self
            .subscriptions
            .find_by_id(id)
            .await
            .map_err(map_subscription_error)?
            .ok_or_else(|| Error::not_found(format!("subscription {id} not found")))?;
        if subscription.user_id != *user_id {
            return Err(Error::unauthorized("subscription belongs to another user"));
        }
        Ok(subscription)
    }

    async fn save(&self, subscription: &Subscription) -> Result<(), Error> {
        self.subscriptions
            .update(subscription)
            .await
            .map_err(map_subscription_error)
    }
}

#[async_trait]
impl<S, C, G> SubscriptionCommand for SubscriptionService<S, C, G>
where
    S: SubscriptionRepository,
    C: CityRepository,
    G: Geocoder,
{
    async fn create(&self, request: CreateSubscriptionRequest) -> Result<Subscription, Error> {
        // Skip geocoding when the insert would be refused anyway; the store
        // re-checks both rules atomically.
        let existing = self
            .subscriptions
            .list_for_user(&request.user_id)
            .await
            .map_err(map_subscription_error)?;
        if existing.len() >= SUBSCRIPTION_LIMIT {
            return Err(limit_reached(SUBSCRIPTION_LIMIT));
        }
        if existing.iter().any(|s| s.city.name == request.city) {
            return Err(map_subscription_error(
                SubscriptionPersistenceError::duplicate(request.city.to_string()),
            ));
        }

        let city = self.resolve_city(&request.city).await?;
        let subscription = Subscription::new(
            request.user_id,
            city,
            request.period.unwrap_or_default(),
            request.flags,
            self.clock.utc(),
        );
        self.subscriptions
            .insert_within_limit(&subscription, SUBSCRIPTION_LIMIT)
            .await
            .map_err(map_subscription_error)?;
        info!(
            subscription_id = %subscription.id,
            user_id = %subscription.user_id,
            city = %subscription.city.name,
            "subscription created"
        );
        Ok(subscription)
    }

    async fn toggle(
        &self,
        user_id: &UserId,
        id: &SubscriptionId,
        field: ReportField,
    ) -> Result<Subscription, Error> {
        let mut subscription = self.owned(user_id, id).await?;
        subscription.toggle(field, self.clock.utc());
        self.save(&subscription).await?;
        Ok(subscription)
    }

    async fn change_period(
        &self,
        user_id: &UserId,
        id: &SubscriptionId,
        period: Period,
    ) -> Result<Subscription, Error> {
        let mut subscription = self.owned(user_id, id).await?;
        subscription.change_period(period, self.clock.utc());
        self.save(&subscription).await?;
        Ok(subscription)
    }

    async fn delete(&self, user_id: &UserId, id: &SubscriptionId) -> Result<(), Error> {
        self.owned(user_id, id).await?;
        let removed = self
            .subscriptions
            .delete(id)
            .await
            .map_err(map_subscription_error)?;
        if !removed {
            return Err(Error::not_found(format!("subscription {id} not found")));
        }
        info!(subscription_id = %id, "subscription deleted");
        Ok(())
    }
}

#[async_trait]
impl<S, C, G> SubscriptionQuery for SubscriptionService<S, C, G>
where
    S: SubscriptionRepository,
    C: CityRepository,
    G: Geocoder,
{
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Subscription>, Error> {
        self.subscriptions
            .list_for_user(user_id)
            .await
            .map_err(map_subscription_error)
    }
}

#[cfg(test)]
#[path = "subscription_service_tests.rs"]
mod tests;
