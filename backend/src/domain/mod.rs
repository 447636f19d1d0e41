//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed entities shared by the HTTP, job and
//! persistence layers, plus the services implementing the driving ports.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifier.
//! - User, City, Subscription, WeatherSnapshot: core aggregates.
//! - Services: [`AccountService`], [`SubscriptionService`],
//!   [`WeatherService`] and [`ForecastDispatchService`].

pub mod auth;
pub mod city;
pub mod error;
pub mod forecast;
pub mod ports;
pub mod schedule;
pub mod subscription;
pub mod trace_id;
pub mod user;
pub mod weather;

mod account_service;
mod forecast_dispatch_service;
mod subscription_service;
mod weather_service;

#[cfg(test)]
mod test_fixtures;

pub use self::account_service::AccountService;
pub use self::auth::{
    LoginCredentials, LoginValidationError, PASSWORD_MIN, Registration,
    RegistrationValidationError,
};
pub use self::city::{City, CityId, CityName, CityValidationError, Coordinates};
pub use self::error::{Error, ErrorCode};
pub use self::forecast::{ForecastEmail, Recipient, compose_forecast};
pub use self::forecast_dispatch_service::ForecastDispatchService;
pub use self::schedule::{DueSelection, next_slot, reschedule_if_past, truncate_to_hour};
pub use self::subscription::{
    InvalidPeriod, Period, ReportField, ReportFlags, SUBSCRIPTION_LIMIT, Subscription,
    SubscriptionId, UnknownReportField,
};
pub use self::subscription_service::SubscriptionService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{EmailAddress, User, UserAccount, UserId, UserValidationError, Username};
pub use self::weather::{FreshnessPolicy, MalformedReport, WeatherReport, WeatherSnapshot};
pub use self::weather_service::{WeatherPorts, WeatherService};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use weather_reminder::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
