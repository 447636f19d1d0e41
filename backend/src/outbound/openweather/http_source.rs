//! Reqwest-backed current-weather adapter.
//!
//! Calls the `/data/2.5/weather` endpoint in metric units and hands back the
//! JSON object untouched; the cache stores it verbatim.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use zeroize::Zeroizing;

use super::super::http::{UpstreamFailure, status_failure, transport_failure};
use crate::domain::Coordinates;
use crate::domain::ports::{WeatherSource, WeatherSourceError};

/// Production current-weather endpoint.
pub const OPENWEATHER_DEFAULT_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Weather source performing one GET per lookup.
pub struct OpenWeatherHttpSource {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
}

impl OpenWeatherHttpSource {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: Zeroizing::new(api_key.into()),
        })
    }

    fn request_url(&self, coordinates: &Coordinates) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("lat", &coordinates.latitude().to_string())
            .append_pair("lon", &coordinates.longitude().to_string())
            .append_pair("appid", self.api_key.as_str())
            .append_pair("units", "metric");
        url
    }
}

fn map_failure(failure: UpstreamFailure) -> WeatherSourceError {
    match failure {
        UpstreamFailure::Transport(message) => WeatherSourceError::transport(message),
        UpstreamFailure::Timeout(message) => WeatherSourceError::timeout(message),
        UpstreamFailure::RateLimited(message) => WeatherSourceError::rate_limited(message),
        UpstreamFailure::InvalidRequest(message) => WeatherSourceError::invalid_request(message),
    }
}

fn parse_payload(body: &[u8]) -> Result<Value, WeatherSourceError> {
    let value: Value = serde_json::from_slice(body).map_err(|error| {
        WeatherSourceError::decode(format!("invalid weather JSON payload: {error}"))
    })?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(WeatherSourceError::decode("weather payload is not a JSON object"))
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherHttpSource {
    async fn current(&self, coordinates: &Coordinates) -> Result<Value, WeatherSourceError> {
        let response = self
            .client
            .get(self.request_url(coordinates))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| map_failure(transport_failure(&err)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| map_failure(transport_failure(&err)))?;
        if !status.is_success() {
            return Err(map_failure(status_failure(status, body.as_ref())));
        }
        parse_payload(body.as_ref())
    }
}
