//! PostgreSQL-backed `WeatherCacheRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{WeatherCacheError, WeatherCacheRepository};
use crate::domain::{CityId, WeatherSnapshot};

use super::error_mapping::{DbFailure, diesel_failure, pool_failure};
use super::models::WeatherRow;
use super::pool::{DbPool, PoolError};
use super::schema::weather_data;

/// Diesel-backed implementation of the [`WeatherCacheRepository`] port.
#[derive(Clone)]
pub struct DieselWeatherCacheRepository {
    pool: DbPool,
}

impl DieselWeatherCacheRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> WeatherCacheError {
    match failure {
        DbFailure::Connection(message) => WeatherCacheError::connection(message),
        DbFailure::UniqueViolation(_) => WeatherCacheError::query("unexpected unique violation"),
        DbFailure::Query(message) => WeatherCacheError::query(message),
    }
}

fn map_pool_error(error: PoolError) -> WeatherCacheError {
    map_failure(pool_failure(error))
}

fn map_diesel_error(error: diesel::result::Error) -> WeatherCacheError {
    map_failure(diesel_failure(error))
}

#[async_trait]
impl WeatherCacheRepository for DieselWeatherCacheRepository {
    async fn find(&self, city_id: &CityId) -> Result<Option<WeatherSnapshot>, WeatherCacheError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<WeatherRow> = weather_data::table
            .find(city_id.as_uuid())
            .select(WeatherRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(WeatherSnapshot::from))
    }

    async fn upsert(&self, snapshot: &WeatherSnapshot) -> Result<(), WeatherCacheError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(weather_data::table)
            .values(WeatherRow::from(snapshot))
            .on_conflict(weather_data::city_id)
            .do_update()
            .set((
                weather_data::updated_at.eq(excluded(weather_data::updated_at)),
                weather_data::payload.eq(excluded(weather_data::payload)),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn list_stale(&self, cutoff: DateTime<Utc>) -> Result<Vec<CityId>, WeatherCacheError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids: Vec<uuid::Uuid> = weather_data::table
            .filter(weather_data::updated_at.le(cutoff))
            .order(weather_data::updated_at.asc())
            .select(weather_data::city_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(ids.into_iter().map(CityId::from_uuid).collect())
    }
}
