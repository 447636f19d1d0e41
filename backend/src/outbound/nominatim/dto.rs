//! DTOs for decoding Nominatim search responses.
//!
//! Nominatim returns coordinates as decimal strings.

use serde::Deserialize;

use crate::domain::Coordinates;

#[derive(Debug, Deserialize)]
pub(super) struct PlaceDto {
    pub(super) lat: String,
    pub(super) lon: String,
}

impl PlaceDto {
    pub(super) fn into_coordinates(self) -> Result<Coordinates, String> {
        let latitude: f64 = self
            .lat
            .trim()
            .parse()
            .map_err(|err| format!("latitude '{}' is not a number: {err}", self.lat))?;
        let longitude: f64 = self
            .lon
            .trim()
            .parse()
            .map_err(|err| format!("longitude '{}' is not a number: {err}", self.lon))?;
        Coordinates::new(latitude, longitude).map_err(|err| err.to_string())
    }
}
