//! Nominatim outbound adapter for the `Geocoder` port.

mod dto;
mod http_geocoder;

pub use http_geocoder::{NOMINATIM_DEFAULT_ENDPOINT, NominatimGeocoder};
