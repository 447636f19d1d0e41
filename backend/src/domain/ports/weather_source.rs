//! Port for the upstream current-weather provider.
use async_trait::async_trait;
use serde_json::Value;

use crate::domain::Coordinates;

use super::define_port_error;

define_port_error! {
    /// Errors raised when fetching current weather.
    pub enum WeatherSourceError {
        /// Request could not be sent or the connection failed.
        Transport { message: String } => "weather provider transport failed: {message}",
        /// Request timed out.
        Timeout { message: String } => "weather provider request timed out: {message}",
        /// Upstream asked us to slow down.
        RateLimited { message: String } => "weather provider rate limited request: {message}",
        /// Upstream rejected the request (bad key, bad coordinates).
        InvalidRequest { message: String } => "weather provider rejected request: {message}",
        /// Response body was not JSON.
        Decode { message: String } => "weather provider response decode failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Current conditions at `coordinates`, as the provider's raw JSON.
    async fn current(&self, coordinates: &Coordinates) -> Result<Value, WeatherSourceError>;
}
