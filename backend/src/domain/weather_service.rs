//! Weather cache service.
//!
//! Reads serve the per-city cache while it is younger than the TTL and fall
//! back to the upstream provider otherwise. The refresh jobs go through the
//! same fetch-and-store path.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    BackfillSummary, CityPersistenceError, CityRepository, RefreshQueue, RefreshQueueError,
    SubscriptionPersistenceError, SubscriptionRepository, WeatherCacheError,
    WeatherCacheRepository, WeatherQuery, WeatherRefresh, WeatherSource, WeatherSourceError,
};
use crate::domain::{City, CityId, Error, FreshnessPolicy, SubscriptionId, WeatherSnapshot};

/// Weather service implementing the query and refresh ports.
#[derive(Clone)]
pub struct WeatherService {
    source: Arc<dyn WeatherSource>,
    cache: Arc<dyn WeatherCacheRepository>,
    cities: Arc<dyn CityRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    queue: Arc<dyn RefreshQueue>,
    clock: Arc<dyn Clock>,
    policy: FreshnessPolicy,
}

/// Driven ports the weather service depends on.
#[derive(Clone)]
pub struct WeatherPorts {
    pub source: Arc<dyn WeatherSource>,
    pub cache: Arc<dyn WeatherCacheRepository>,
    pub cities: Arc<dyn CityRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub queue: Arc<dyn RefreshQueue>,
}

impl WeatherService {
    /// Create a new service with the default freshness policy.
    pub fn new(ports: WeatherPorts, clock: Arc<dyn Clock>) -> Self {
        Self {
            source: ports.source,
            cache: ports.cache,
            cities: ports.cities,
            subscriptions: ports.subscriptions,
            queue: ports.queue,
            clock,
            policy: FreshnessPolicy::default(),
        }
    }

    /// Replace the freshness policy.
    pub fn with_policy(mut self, policy: FreshnessPolicy) -> Self {
        self.policy = policy;
        self
    }

    async fn fetch_and_store(&self, city: &City) -> Result<WeatherSnapshot, WeatherFetchError> {
        let payload = self
            .source
            .current(&city.coordinates)
            .await
            .map_err(WeatherFetchError::Source)?;
        let snapshot = WeatherSnapshot {
            city_id: city.id,
            updated_at: self.clock.utc(),
            payload,
        };
        self.cache
            .upsert(&snapshot)
            .await
            .map_err(WeatherFetchError::Cache)?;
        debug!(city_id = %city.id, city = %city.name, "weather refreshed");
        Ok(snapshot)
    }
}

#[derive(Debug)]
enum WeatherFetchError {
    Source(WeatherSourceError),
    Cache(WeatherCacheError),
}

impl From<WeatherFetchError> for Error {
    fn from(error: WeatherFetchError) -> Self {
        match error {
            WeatherFetchError::Source(err) => {
                Error::internal(format!("weather provider failed: {err}"))
            }
            WeatherFetchError::Cache(err) => map_cache_error(err),
        }
    }
}

fn map_cache_error(error: WeatherCacheError) -> Error {
    match error {
        WeatherCacheError::Connection { message } => {
            Error::service_unavailable(format!("weather cache unavailable: {message}"))
        }
        WeatherCacheError::Query { message } => {
            Error::internal(format!("weather cache error: {message}"))
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

fn map_subscription_error(error: SubscriptionPersistenceError) -> Error {
    match error {
        SubscriptionPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("subscription repository unavailable: {message}"))
        }
        other => Error::internal(format!("subscription repository error: {other}")),
    }
}

fn map_queue_error(error: RefreshQueueError) -> Error {
    Error::service_unavailable(error.to_string())
}

#[async_trait]
impl WeatherQuery for WeatherService {
    async fn current_for_subscription(&self, id: &SubscriptionId) -> Result<Value, Error> {
        let subscription = self
            .subscriptions
            .find_by_id(id)
            .await
            .map_err(map_subscription_error)?
            .ok_or_else(|| Error::not_found(format!("subscription {id} not found")))?;
        self.current_for_city(&subscription.city).await
    }

    async fn current_for_city(&self, city: &City) -> Result<Value, Error> {
        let cached = self.cache.find(&city.id).await.map_err(map_cache_error)?;
        let now = self.clock.utc();
        if let Some(snapshot) = cached.as_ref().filter(|s| self.policy.is_fresh(s, now)) {
            return Ok(snapshot.payload.clone());
        }

        match self.fetch_and_store(city).await {
            Ok(snapshot) => Ok(snapshot.payload),
            Err(err) => match cached {
                Some(stale) => {
                    warn!(
                        city_id = %city.id,
                        age_minutes = stale.age(now).num_minutes(),
                        error = ?err,
                        "weather refresh failed; serving stale snapshot"
                    );
                    Ok(stale.payload)
                }
                None => Err(err.into()),
            },
        }
    }
}

#[async_trait]
impl WeatherRefresh for WeatherService {
    async fn refresh_city(&self, city_id: &CityId) -> Result<WeatherSnapshot, Error> {
        let city = self
            .cities
            .find_by_id(city_id)
            .await
            .map_err(map_city_error)?
            .ok_or_else(|| Error::not_found(format!("city {city_id} not found")))?;
        Ok(self.fetch_and_store(&city).await?)
    }

    async fn refresh_stale(&self) -> Result<usize, Error> {
        let cutoff = self.policy.refresh_cutoff(self.clock.utc());
        let stale = self
            .cache
            .list_stale(cutoff)
            .await
            .map_err(map_cache_error)?;
        for city_id in &stale {
            self.queue
                .enqueue(*city_id)
                .await
                .map_err(map_queue_error)?;
        }
        if !stale.is_empty() {
            info!(count = stale.len(), %cutoff, "stale weather refreshes queued");
        }
        Ok(stale.len())
    }

    async fn backfill_missing(&self) -> Result<BackfillSummary, Error> {
        let missing = self
            .cities
            .list_without_weather()
            .await
            .map_err(map_city_error)?;
        let mut summary = BackfillSummary {
            attempted: missing.len(),
            ..BackfillSummary::default()
        };
        for city in &missing {
            match self.fetch_and_store(city).await {
                Ok(_) => summary.refreshed += 1,
                Err(err) => {
                    summary.failed += 1;
                    warn!(city_id = %city.id, city = %city.name, error = ?err, "weather backfill failed");
                }
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
#[path = "weather_service_tests.rs"]
mod tests;
