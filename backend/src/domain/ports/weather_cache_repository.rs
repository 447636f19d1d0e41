//! Port for the per-city weather cache table.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{CityId, WeatherSnapshot};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by weather cache adapters.
    pub enum WeatherCacheError {
        /// Repository connection could not be established.
        Connection { message: String } => "weather cache connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "weather cache query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherCacheRepository: Send + Sync {
    async fn find(&self, city_id: &CityId) -> Result<Option<WeatherSnapshot>, WeatherCacheError>;

    /// Insert or replace the snapshot for its city.
    async fn upsert(&self, snapshot: &WeatherSnapshot) -> Result<(), WeatherCacheError>;

    /// Cities whose snapshot was updated at or before `cutoff`.
    async fn list_stale(&self, cutoff: DateTime<Utc>) -> Result<Vec<CityId>, WeatherCacheError>;
}
