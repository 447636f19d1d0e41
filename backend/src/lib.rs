//! Weather reminder backend.
//!
//! Users subscribe to cities and receive periodic weather emails. The crate is
//! laid out as ports and adapters:
//! - [`domain`]: aggregates, ports and the services implementing them.
//! - [`inbound`]: HTTP handlers and background jobs driving the services.
//! - [`outbound`]: PostgreSQL, OpenWeather, Nominatim, SMTP and queue adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(feature = "test-support")]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
