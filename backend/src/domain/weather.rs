//! Cached weather payloads and the freshness rules applied to them.
//!
//! The provider payload is stored verbatim as JSON. Only the forecast email
//! needs typed access, through [`WeatherReport`].

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::city::CityId;

/// Latest provider payload for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city_id: CityId,
    pub updated_at: DateTime<Utc>,
    pub payload: Value,
}

impl WeatherSnapshot {
    /// Age of the snapshot at `now`.
    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        now - self.updated_at
    }
}

/// Freshness thresholds for cached weather.
///
/// Reads accept a snapshot up to `ttl` old. The refresh job re-fetches
/// anything at least `refresh_after` old so readers rarely see stale data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    ttl: TimeDelta,
    refresh_after: TimeDelta,
}

impl FreshnessPolicy {
    /// Build a policy; `refresh_after` is clamped to `ttl`.
    pub fn new(ttl: TimeDelta, refresh_after: TimeDelta) -> Self {
        Self {
            ttl,
            refresh_after: refresh_after.min(ttl),
        }
    }

    /// Whether a read at `now` may serve `snapshot` as-is.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeDelta, Utc};
    /// use serde_json::json;
    /// use weather_reminder::domain::{CityId, FreshnessPolicy, WeatherSnapshot};
    ///
    /// let now = Utc::now();
    /// let snapshot = WeatherSnapshot {
    ///     city_id: CityId::random(),
    ///     updated_at: now - TimeDelta::minutes(59),
    ///     payload: json!({}),
    /// };
    /// assert!(FreshnessPolicy::default().is_fresh(&snapshot, now));
    /// ```
    pub fn is_fresh(&self, snapshot: &WeatherSnapshot, now: DateTime<Utc>) -> bool {
        snapshot.age(now) <= self.ttl
    }

    /// Rows updated at or before this instant are due for a background refresh.
    pub fn refresh_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.refresh_after
    }

    /// Read-side TTL.
    pub const fn ttl(&self) -> TimeDelta {
        self.ttl
    }
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::new(TimeDelta::hours(1), TimeDelta::minutes(55))
    }
}

/// Typed view over the subset of the provider payload used in emails.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeatherReport {
    pub main: MainReadings,
    #[serde(default)]
    pub wind: Option<WindReadings>,
    #[serde(default)]
    pub clouds: Option<CloudReadings>,
    #[serde(default)]
    pub weather: Vec<ConditionReading>,
}

/// Thermodynamic readings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub pressure: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WindReadings {
    pub speed: f64,
    #[serde(default)]
    pub deg: Option<f64>,
    #[serde(default)]
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CloudReadings {
    pub all: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConditionReading {
    pub description: String,
}

/// Payload is missing a reading the email needs.
#[derive(Debug, thiserror::Error)]
#[error("weather payload is not a recognised report: {0}")]
pub struct MalformedReport(#[from] serde_json::Error);

impl WeatherReport {
    /// Decode the typed view from a stored payload.
    pub fn from_payload(payload: &Value) -> Result<Self, MalformedReport> {
        Ok(Self::deserialize(payload)?)
    }
}
