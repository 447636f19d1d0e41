//! Cities that users subscribe to, with their geocoded position.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Maximum city name length, in characters.
pub const CITY_NAME_MAX: usize = 100;

/// Validation errors for city values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CityValidationError {
    #[error("city name must not be empty")]
    EmptyName,
    #[error("city name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("latitude {value} is outside [-90, 90]")]
    LatitudeOutOfRange { value: f64 },
    #[error("longitude {value} is outside [-180, 180]")]
    LongitudeOutOfRange { value: f64 },
}

/// Identifier of a stored city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(Uuid);

impl CityId {
    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a UUID read from storage.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// City name as typed by the user, trimmed. Case is preserved and significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CityName(String);

impl CityName {
    /// Validate and construct a city name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CityValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CityValidationError::EmptyName);
        }
        if trimmed.chars().count() > CITY_NAME_MAX {
            return Err(CityValidationError::NameTooLong { max: CITY_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for CityName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CityName> for String {
    fn from(value: CityName) -> Self {
        value.0
    }
}

impl TryFrom<String> for CityName {
    type Error = CityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Validate latitude and longitude ranges.
    ///
    /// # Examples
    /// ```
    /// use weather_reminder::domain::Coordinates;
    ///
    /// let kyiv = Coordinates::new(50.45, 30.52).unwrap();
    /// assert_eq!(kyiv.latitude(), 50.45);
    /// assert!(Coordinates::new(91.0, 0.0).is_err());
    /// ```
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CityValidationError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CityValidationError::LatitudeOutOfRange { value: latitude });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CityValidationError::LongitudeOutOfRange { value: longitude });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// A city geocoded once, when it was first subscribed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct City {
    #[schema(value_type = String)]
    pub id: CityId,
    #[schema(value_type = String, example = "Kyiv")]
    pub name: CityName,
    pub coordinates: Coordinates,
}
