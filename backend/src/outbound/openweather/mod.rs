//! OpenWeatherMap outbound adapter for the `WeatherSource` port.

mod http_source;

pub use http_source::{OPENWEATHER_DEFAULT_ENDPOINT, OpenWeatherHttpSource};
