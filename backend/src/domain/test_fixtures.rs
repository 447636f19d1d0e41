//! Shared fixtures for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    City, CityId, CityName, Coordinates, EmailAddress, Period, Recipient, ReportFlags,
    Subscription, UserId, Username,
};

pub(crate) fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, minute, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn clock_at(utc_now: DateTime<Utc>) -> Arc<dyn Clock> {
    Arc::new(FixtureClock { utc_now })
}

pub(crate) fn city(name: &str) -> City {
    City {
        id: CityId::random(),
        name: CityName::new(name).expect("valid city name"),
        coordinates: Coordinates::new(50.45, 30.52).expect("valid coordinates"),
    }
}

pub(crate) fn subscription_for(user_id: UserId, name: &str, now: DateTime<Utc>) -> Subscription {
    Subscription::new(
        user_id,
        city(name),
        Period::default(),
        ReportFlags::default(),
        now,
    )
}

pub(crate) fn recipient() -> Recipient {
    Recipient {
        username: Username::new("ada").expect("valid username"),
        email: EmailAddress::new("ada@example.com").expect("valid email"),
    }
}
