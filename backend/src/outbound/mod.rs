//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **openweather**: current conditions from the OpenWeather API
//! - **nominatim**: city geocoding against OpenStreetMap Nominatim
//! - **mail**: SMTP delivery of forecast emails
//! - **security**: Argon2id password hashing
//! - **queue**: in-process refresh queue feeding the weather worker
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

mod http;
pub mod mail;
pub mod nominatim;
pub mod openweather;
pub mod persistence;
pub mod queue;
pub mod security;
