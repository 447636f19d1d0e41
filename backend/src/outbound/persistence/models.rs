//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions back into domain types
//! re-validate stored values and report corrupt rows as plain messages.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    City, CityId, CityName, Coordinates, EmailAddress, Period, ReportFlags, Subscription,
    SubscriptionId, User, UserAccount, UserId, Username, WeatherSnapshot,
};

use super::schema::{cities, subscriptions, users, weather_data};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub is_active: bool,
}

impl<'a> From<&'a UserAccount> for NewUserRow<'a> {
    fn from(account: &'a UserAccount) -> Self {
        Self {
            id: *account.user.id.as_uuid(),
            username: account.user.username.as_ref(),
            email: account.user.email.as_ref(),
            password_hash: &account.password_hash,
            is_active: account.user.is_active,
        }
    }
}

impl UserRow {
    pub(crate) fn into_account(self) -> Result<UserAccount, String> {
        let username = Username::new(&self.username)
            .map_err(|err| format!("stored username for {} is invalid: {err}", self.id))?;
        let email = EmailAddress::new(&self.email)
            .map_err(|err| format!("stored email for {} is invalid: {err}", self.id))?;
        Ok(UserAccount {
            user: User {
                id: UserId::from_uuid(self.id),
                username,
                email,
                is_active: self.is_active,
            },
            password_hash: self.password_hash,
        })
    }
}

// ---------------------------------------------------------------------------
// Cities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CityRow {
    pub id: Uuid,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cities)]
pub(crate) struct NewCityRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub latitude: f64,
    pub longitude: f64,
}

impl<'a> From<&'a City> for NewCityRow<'a> {
    fn from(city: &'a City) -> Self {
        Self {
            id: *city.id.as_uuid(),
            name: city.name.as_ref(),
            latitude: city.coordinates.latitude(),
            longitude: city.coordinates.longitude(),
        }
    }
}

impl TryFrom<CityRow> for City {
    type Error = String;

    fn try_from(row: CityRow) -> Result<Self, Self::Error> {
        let name = CityName::new(&row.name)
            .map_err(|err| format!("stored city name for {} is invalid: {err}", row.id))?;
        let coordinates = Coordinates::new(row.latitude, row.longitude)
            .map_err(|err| format!("stored coordinates for {} are invalid: {err}", row.id))?;
        Ok(City {
            id: CityId::from_uuid(row.id),
            name,
            coordinates,
        })
    }
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = subscriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SubscriptionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub period: i32,
    pub next_message: DateTime<Utc>,
    pub is_active: bool,
    pub temperature: bool,
    pub precipitation: bool,
    pub cloudiness: bool,
    pub humidity: bool,
    pub wind: bool,
    pub wind_speed: bool,
    pub pressure: bool,
    pub feels_like: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionRow {
    pub(crate) fn into_subscription(self, city: City) -> Result<Subscription, String> {
        let period = Period::new(self.period)
            .map_err(|err| format!("stored period for subscription {} is invalid: {err}", self.id))?;
        Ok(Subscription {
            id: SubscriptionId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            city,
            period,
            next_message: self.next_message,
            is_active: self.is_active,
            flags: ReportFlags {
                temperature: self.temperature,
                precipitation: self.precipitation,
                cloudiness: self.cloudiness,
                humidity: self.humidity,
                wind: self.wind,
                wind_speed: self.wind_speed,
                pressure: self.pressure,
                feels_like: self.feels_like,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subscriptions)]
pub(crate) struct NewSubscriptionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub city_id: Uuid,
    pub period: i32,
    pub next_message: DateTime<Utc>,
    pub is_active: bool,
    pub temperature: bool,
    pub precipitation: bool,
    pub cloudiness: bool,
    pub humidity: bool,
    pub wind: bool,
    pub wind_speed: bool,
    pub pressure: bool,
    pub feels_like: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable columns written by [`Subscription`] updates.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = subscriptions)]
pub(crate) struct SubscriptionUpdate {
    pub period: i32,
    pub next_message: DateTime<Utc>,
    pub is_active: bool,
    pub temperature: bool,
    pub precipitation: bool,
    pub cloudiness: bool,
    pub humidity: bool,
    pub wind: bool,
    pub wind_speed: bool,
    pub pressure: bool,
    pub feels_like: bool,
    pub updated_at: DateTime<Utc>,
}

/// Period hours never exceed one year, so they fit in `i32`.
fn period_column(period: Period) -> i32 {
    i32::try_from(period.hours()).unwrap_or(i32::MAX)
}

impl From<&Subscription> for NewSubscriptionRow {
    fn from(s: &Subscription) -> Self {
        let f = s.flags;
        Self {
            id: *s.id.as_uuid(),
            user_id: *s.user_id.as_uuid(),
            city_id: *s.city.id.as_uuid(),
            period: period_column(s.period),
            next_message: s.next_message,
            is_active: s.is_active,
            temperature: f.temperature,
            precipitation: f.precipitation,
            cloudiness: f.cloudiness,
            humidity: f.humidity,
            wind: f.wind,
            wind_speed: f.wind_speed,
            pressure: f.pressure,
            feels_like: f.feels_like,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

impl From<&Subscription> for SubscriptionUpdate {
    fn from(s: &Subscription) -> Self {
        let f = s.flags;
        Self {
            period: period_column(s.period),
            next_message: s.next_message,
            is_active: s.is_active,
            temperature: f.temperature,
            precipitation: f.precipitation,
            cloudiness: f.cloudiness,
            humidity: f.humidity,
            wind: f.wind,
            wind_speed: f.wind_speed,
            pressure: f.pressure,
            feels_like: f.feels_like,
            updated_at: s.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Weather cache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = weather_data)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WeatherRow {
    pub city_id: Uuid,
    pub updated_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl From<WeatherRow> for WeatherSnapshot {
    fn from(row: WeatherRow) -> Self {
        Self {
            city_id: CityId::from_uuid(row.city_id),
            updated_at: row.updated_at,
            payload: row.payload,
        }
    }
}

impl From<&WeatherSnapshot> for WeatherRow {
    fn from(snapshot: &WeatherSnapshot) -> Self {
        Self {
            city_id: *snapshot.city_id.as_uuid(),
            updated_at: snapshot.updated_at,
            payload: snapshot.payload.clone(),
        }
    }
}
