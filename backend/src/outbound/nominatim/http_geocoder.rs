//! Reqwest-backed Nominatim geocoder.
//!
//! Nominatim's usage policy requires an identifying user agent, so the
//! adapter refuses to build without one.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::super::http::{UpstreamFailure, status_failure, transport_failure};
use super::dto::PlaceDto;
use crate::domain::ports::{Geocoder, GeocodingError};
use crate::domain::{CityName, Coordinates};

/// Public Nominatim search endpoint.
pub const NOMINATIM_DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";

/// Geocoder resolving the best single match for a free-form place name.
pub struct NominatimGeocoder {
    client: Client,
    endpoint: Url,
}

impl NominatimGeocoder {
    /// Build a geocoder identifying itself with `user_agent`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, endpoint })
    }

    fn request_url(&self, name: &CityName) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", name.as_ref())
            .append_pair("format", "json")
            .append_pair("limit", "1");
        url
    }
}

fn map_failure(failure: UpstreamFailure) -> GeocodingError {
    match failure {
        UpstreamFailure::Transport(message) => GeocodingError::transport(message),
        UpstreamFailure::Timeout(message) => GeocodingError::timeout(message),
        UpstreamFailure::RateLimited(message) => GeocodingError::rate_limited(message),
        UpstreamFailure::InvalidRequest(message) => GeocodingError::invalid_request(message),
    }
}

fn parse_best_match(body: &[u8]) -> Result<Option<Coordinates>, GeocodingError> {
    let places: Vec<PlaceDto> = serde_json::from_slice(body).map_err(|error| {
        GeocodingError::decode(format!("invalid Nominatim JSON payload: {error}"))
    })?;
    places
        .into_iter()
        .next()
        .map(PlaceDto::into_coordinates)
        .transpose()
        .map_err(GeocodingError::decode)
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn locate(&self, name: &CityName) -> Result<Option<Coordinates>, GeocodingError> {
        let response = self
            .client
            .get(self.request_url(name))
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
        parse_best_match(body.as_ref())
    }
}
