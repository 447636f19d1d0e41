//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, upstream HTTP services, mail, queue) are
//! implemented in `outbound`. Driving ports are implemented by the services in
//! `domain::services` and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod city_repository;
mod forecast_dispatch;
mod geocoder;
mod login_service;
mod mailer;
mod password_hasher;
mod refresh_queue;
mod registration_service;
mod subscription_command;
mod subscription_query;
mod subscription_repository;
mod user_repository;
mod users_query;
mod weather_cache_repository;
mod weather_query;
mod weather_refresh;
mod weather_source;

#[cfg(test)]
pub use city_repository::MockCityRepository;
pub use city_repository::{CityPersistenceError, CityRepository};
#[cfg(test)]
pub use forecast_dispatch::MockForecastDispatch;
pub use forecast_dispatch::{DispatchSummary, ForecastDispatch};
#[cfg(test)]
pub use geocoder::MockGeocoder;
pub use geocoder::{Geocoder, GeocodingError};
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use mailer::MockMailer;
pub use mailer::{Mailer, MailerError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use refresh_queue::MockRefreshQueue;
pub use refresh_queue::{RefreshQueue, RefreshQueueError};
#[cfg(test)]
pub use registration_service::MockRegistrationService;
pub use registration_service::RegistrationService;
#[cfg(test)]
pub use subscription_command::MockSubscriptionCommand;
pub use subscription_command::{CreateSubscriptionRequest, SubscriptionCommand};
#[cfg(test)]
pub use subscription_query::MockSubscriptionQuery;
pub use subscription_query::SubscriptionQuery;
#[cfg(test)]
pub use subscription_repository::MockSubscriptionRepository;
pub use subscription_repository::{
    ScheduledSubscription, SubscriptionPersistenceError, SubscriptionRepository,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
#[cfg(test)]
pub use weather_cache_repository::MockWeatherCacheRepository;
pub use weather_cache_repository::{WeatherCacheError, WeatherCacheRepository};
#[cfg(test)]
pub use weather_query::MockWeatherQuery;
pub use weather_query::WeatherQuery;
#[cfg(test)]
pub use weather_refresh::MockWeatherRefresh;
pub use weather_refresh::{BackfillSummary, WeatherRefresh};
#[cfg(test)]
pub use weather_source::MockWeatherSource;
pub use weather_source::{WeatherSource, WeatherSourceError};
