//! Driving port used by the background refresh jobs.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{CityId, Error, WeatherSnapshot};

/// Outcome of one backfill pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackfillSummary {
    pub attempted: usize,
    pub refreshed: usize,
    pub failed: usize,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherRefresh: Send + Sync {
    /// Fetch and store fresh weather for one city.
    async fn refresh_city(&self, city_id: &CityId) -> Result<WeatherSnapshot, Error>;

    /// Enqueue a refresh for every stale city; returns how many were queued.
    async fn refresh_stale(&self) -> Result<usize, Error>;

    /// Synchronously fetch weather for cities that have none cached.
    async fn backfill_missing(&self) -> Result<BackfillSummary, Error>;
}
