//! Port for the geocoded city catalogue.
use async_trait::async_trait;

use crate::domain::{City, CityId, CityName};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by city repository adapters.
    pub enum CityPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "city repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "city repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CityRepository: Send + Sync {
    /// Look a city up by its exact name.
    async fn find_by_name(&self, name: &CityName) -> Result<Option<City>, CityPersistenceError>;

    async fn find_by_id(&self, id: &CityId) -> Result<Option<City>, CityPersistenceError>;

    /// Store `city` unless a city with the same name exists; return the stored row.
    async fn insert_or_get(&self, city: &City) -> Result<City, CityPersistenceError>;

    /// Cities that have no cached weather row yet.
    async fn list_without_weather(&self) -> Result<Vec<City>, CityPersistenceError>;
}
