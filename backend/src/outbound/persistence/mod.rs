//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows
//! (`models.rs`, `schema.rs`) and domain types; no business logic lives here.
//! Connections come from a bb8 pool through `diesel-async`.
//!
//! # Example
//!
//! ```no_run
//! use weather_reminder::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/weather")).await?;
//! let users = DieselUserRepository::new(pool);
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

mod diesel_city_repository;
mod diesel_subscription_repository;
mod diesel_user_repository;
mod diesel_weather_cache_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_city_repository::DieselCityRepository;
pub use diesel_subscription_repository::DieselSubscriptionRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_weather_cache_repository::DieselWeatherCacheRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
