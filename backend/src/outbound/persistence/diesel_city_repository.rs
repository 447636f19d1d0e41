//! PostgreSQL-backed `CityRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CityPersistenceError, CityRepository};
use crate::domain::{City, CityId, CityName};

use super::error_mapping::{DbFailure, diesel_failure, pool_failure};
use super::models::{CityRow, NewCityRow};
use super::pool::DbPool;
use super::schema::{cities, weather_data};

/// Diesel-backed implementation of the [`CityRepository`] port.
#[derive(Clone)]
pub struct DieselCityRepository {
    pool: DbPool,
}

impl DieselCityRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> CityPersistenceError {
    match failure {
        DbFailure::Connection(message) => CityPersistenceError::connection(message),
        DbFailure::UniqueViolation(constraint) => CityPersistenceError::query(format!(
            "unexpected unique violation on {}",
            constraint.as_deref().unwrap_or("cities")
        )),
        DbFailure::Query(message) => CityPersistenceError::query(message),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> CityPersistenceError {
    map_failure(diesel_failure(error))
}

fn to_city(row: CityRow) -> Result<City, CityPersistenceError> {
    City::try_from(row).map_err(CityPersistenceError::query)
}

#[async_trait]
impl CityRepository for DieselCityRepository {
    async fn find_by_name(&self, name: &CityName) -> Result<Option<City>, CityPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(pool_failure(e)))?;
        let row: Option<CityRow> = cities::table
            .filter(cities::name.eq(name.as_ref()))
            .select(CityRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_city).transpose()
    }

    async fn find_by_id(&self, id: &CityId) -> Result<Option<City>, CityPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(pool_failure(e)))?;
        let row: Option<CityRow> = cities::table
            .find(id.as_uuid())
            .select(CityRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_city).transpose()
    }

    async fn insert_or_get(&self, city: &City) -> Result<City, CityPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(pool_failure(e)))?;
        // A concurrent request may have geocoded the same name first; keep
        // whichever row won.
        diesel::insert_into(cities::table)
            .values(NewCityRow::from(city))
            .on_conflict(cities::name)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let row: CityRow = cities::table
            .filter(cities::name.eq(city.name.as_ref()))
            .select(CityRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_city(row)
    }

    async fn list_without_weather(&self) -> Result<Vec<City>, CityPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(pool_failure(e)))?;
        let rows: Vec<CityRow> = cities::table
            .left_join(weather_data::table)
            .filter(weather_data::city_id.is_null())
            .select(CityRow::as_select())
            .order(cities::name.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(to_city).collect()
    }
}
