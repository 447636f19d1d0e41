//! Hour-aligned scheduling rules for forecast emails.
//!
//! Every subscription carries a `next_message` timestamp. Saving a
//! subscription whose slot has already passed moves it to the top of the
//! current hour plus the period; each dispatch attempt pushes it forward by
//! one period.

use std::str::FromStr;

use chrono::{DateTime, DurationRound, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::subscription::Period;

fn one_hour() -> TimeDelta {
    TimeDelta::hours(1)
}

/// Start of the hour containing `at`.
pub fn truncate_to_hour(at: DateTime<Utc>) -> DateTime<Utc> {
    at.duration_trunc(one_hour()).unwrap_or(at)
}

/// First hour-aligned slot `period` hours after the hour containing `now`.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use weather_reminder::domain::{next_slot, Period};
///
/// let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 15, 0).unwrap();
/// let slot = next_slot(now, Period::new(6).unwrap());
/// assert_eq!(slot, Utc.with_ymd_and_hms(2024, 5, 1, 16, 0, 0).unwrap());
/// ```
pub fn next_slot(now: DateTime<Utc>, period: Period) -> DateTime<Utc> {
    truncate_to_hour(now) + period.as_delta()
}

/// Keep `next_message` when it is still ahead of `now`; otherwise move it to
/// [`next_slot`].
pub fn reschedule_if_past(
    next_message: DateTime<Utc>,
    now: DateTime<Utc>,
    period: Period,
) -> DateTime<Utc> {
    if next_message <= now {
        next_slot(now, period)
    } else {
        next_message
    }
}

/// Error returned when parsing an unknown [`DueSelection`] name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown due selection '{0}'; expected current_hour or hour_of_day")]
pub struct UnknownDueSelection(String);

/// How the dispatch job decides which subscriptions are due.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueSelection {
    /// `next_message` falls before the end of the current hour. Overdue
    /// subscriptions are caught up on the next run.
    #[default]
    CurrentHour,
    /// `next_message` has the same hour-of-day as `now`, ignoring the date.
    HourOfDay,
}

impl DueSelection {
    /// Exclusive upper bound a store can use to narrow candidates, if any.
    pub fn due_before(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::CurrentHour => Some(truncate_to_hour(now) + one_hour()),
            Self::HourOfDay => None,
        }
    }

    /// Whether a subscription scheduled at `next_message` is due at `now`.
    pub fn is_due(self, next_message: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            Self::CurrentHour => next_message < truncate_to_hour(now) + one_hour(),
            Self::HourOfDay => next_message.hour() == now.hour(),
        }
    }
}

impl FromStr for DueSelection {
    type Err = UnknownDueSelection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "current_hour" => Ok(Self::CurrentHour),
            "hour_of_day" => Ok(Self::HourOfDay),
            other => Err(UnknownDueSelection(other.to_owned())),
        }
    }
}
