//! Port resolving a city name to coordinates.
use async_trait::async_trait;

use crate::domain::{CityName, Coordinates};

use super::define_port_error;

define_port_error! {
    /// Errors raised when calling the geocoding service.
    pub enum GeocodingError {
        /// Request could not be sent or the connection failed.
        Transport { message: String } => "geocoding transport failed: {message}",
        /// Request timed out.
        Timeout { message: String } => "geocoding request timed out: {message}",
        /// Upstream asked us to slow down.
        RateLimited { message: String } => "geocoding service rate limited request: {message}",
        /// Upstream rejected the request.
        InvalidRequest { message: String } => "geocoding request was rejected: {message}",
        /// Response body could not be decoded.
        Decode { message: String } => "geocoding response decode failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best match for `name`, or `None` when the service knows no such place.
    async fn locate(&self, name: &CityName) -> Result<Option<Coordinates>, GeocodingError>;
}
