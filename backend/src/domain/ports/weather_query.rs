//! Driving port for on-demand weather reads.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{City, Error, SubscriptionId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherQuery: Send + Sync {
    /// Current weather payload for the city behind a subscription.
    async fn current_for_subscription(&self, id: &SubscriptionId) -> Result<Value, Error>;

    /// Current weather payload for `city`.
    ///
    /// Serves the cache while it is fresh and fetches otherwise. When the
    /// fetch fails but an expired snapshot exists, that snapshot is served.
    async fn current_for_city(&self, city: &City) -> Result<Value, Error>;
}
