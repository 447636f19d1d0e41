//! Per-user, per-city forecast subscriptions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::city::City;
use super::schedule::reschedule_if_past;
use super::user::UserId;

/// A user may hold at most this many subscriptions.
pub const SUBSCRIPTION_LIMIT: usize = 5;
/// Period applied when the form leaves it blank.
pub const DEFAULT_PERIOD_HOURS: u32 = 6;
/// Longest accepted period (one year).
pub const MAX_PERIOD_HOURS: u32 = 24 * 365;

/// Identifier of a stored subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a UUID read from storage or a path segment.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rejected period value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("period must be between 1 and {max} hours, got {value}")]
pub struct InvalidPeriod {
    pub value: i64,
    pub max: u32,
}

/// Hours between two forecast emails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Period(u32);

impl Period {
    /// Validate a period in hours.
    pub fn new(hours: impl Into<i64>) -> Result<Self, InvalidPeriod> {
        let value = hours.into();
        u32::try_from(value)
            .ok()
            .filter(|h| (1..=MAX_PERIOD_HOURS).contains(h))
            .map(Self)
            .ok_or(InvalidPeriod {
                value,
                max: MAX_PERIOD_HOURS,
            })
    }

    /// Number of hours.
    pub const fn hours(self) -> u32 {
        self.0
    }

    /// Period as a chrono delta.
    pub fn as_delta(self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.0))
    }
}

impl Default for Period {
    fn default() -> Self {
        Self(DEFAULT_PERIOD_HOURS)
    }
}

impl TryFrom<i64> for Period {
    type Error = InvalidPeriod;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Period> for u32 {
    fn from(value: Period) -> Self {
        value.0
    }
}

/// Error returned for attribute names that cannot be toggled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown subscription attribute '{0}'")]
pub struct UnknownReportField(pub String);

/// Boolean attributes that can be flipped through the toggle endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportField {
    Temperature,
    Precipitation,
    Cloudiness,
    Humidity,
    Wind,
    WindSpeed,
    Pressure,
    FeelsLike,
    IsActive,
}

impl ReportField {
    /// Every toggleable attribute, in form order.
    pub const ALL: [Self; 9] = [
        Self::Temperature,
        Self::Precipitation,
        Self::Cloudiness,
        Self::Humidity,
        Self::Wind,
        Self::WindSpeed,
        Self::Pressure,
        Self::FeelsLike,
        Self::IsActive,
    ];

    /// Wire name used in URLs and JSON.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Precipitation => "precipitation",
            Self::Cloudiness => "cloudiness",
            Self::Humidity => "humidity",
            Self::Wind => "wind",
            Self::WindSpeed => "wind_speed",
            Self::Pressure => "pressure",
            Self::FeelsLike => "feels_like",
            Self::IsActive => "is_active",
        }
    }
}

impl FromStr for ReportField {
    type Err = UnknownReportField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownReportField(s.to_owned()))
    }
}

impl fmt::Display for ReportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which sections a forecast email includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportFlags {
    pub temperature: bool,
    pub precipitation: bool,
    pub cloudiness: bool,
    pub humidity: bool,
    pub wind: bool,
    /// Wind gusts.
    pub wind_speed: bool,
    pub pressure: bool,
    pub feels_like: bool,
}

impl Default for ReportFlags {
    fn default() -> Self {
        Self {
            temperature: true,
            precipitation: true,
            cloudiness: true,
            humidity: false,
            wind: false,
            wind_speed: false,
            pressure: false,
            feels_like: false,
        }
    }
}

/// A user's forecast subscription for one city.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub city: City,
    pub period: Period,
    pub next_message: DateTime<Utc>,
    pub is_active: bool,
    pub flags: ReportFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Build a new subscription with `next_message` already aligned.
    pub fn new(
        user_id: UserId,
        city: City,
        period: Period,
        flags: ReportFlags,
        now: DateTime<Utc>,
    ) -> Self {
        let mut subscription = Self {
            id: SubscriptionId::random(),
            user_id,
            city,
            period,
            next_message: now,
            is_active: true,
            flags,
            created_at: now,
            updated_at: now,
        };
        subscription.touch(now);
        subscription
    }

    /// Apply the save rule: bump `updated_at` and move a past slot forward.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.next_message = reschedule_if_past(self.next_message, now, self.period);
        self.updated_at = now;
    }

    /// Flip one boolean attribute.
    pub fn toggle(&mut self, field: ReportField, now: DateTime<Utc>) {
        let slot = match field {
            ReportField::Temperature => &mut self.flags.temperature,
            ReportField::Precipitation => &mut self.flags.precipitation,
            ReportField::Cloudiness => &mut self.flags.cloudiness,
            ReportField::Humidity => &mut self.flags.humidity,
            ReportField::Wind => &mut self.flags.wind,
            ReportField::WindSpeed => &mut self.flags.wind_speed,
            ReportField::Pressure => &mut self.flags.pressure,
            ReportField::FeelsLike => &mut self.flags.feels_like,
            ReportField::IsActive => &mut self.is_active,
        };
        *slot = !*slot;
        self.touch(now);
    }

    /// Replace the period and re-apply the save rule.
    pub fn change_period(&mut self, period: Period, now: DateTime<Utc>) {
        self.period = period;
        self.touch(now);
    }

    /// Move to the following slot after a dispatch attempt, whatever its outcome.
    pub fn advance(&mut self, now: DateTime<Utc>) {
        self.next_message += self.period.as_delta();
        self.touch(now);
    }
}
