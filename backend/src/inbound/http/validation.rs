//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;
use uuid::Uuid;

use crate::domain::{Error, InvalidPeriod, Period, SubscriptionId};

/// Build an `invalid_request` error pointing at one form field.
pub(crate) fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

fn invalid_period(field: &str, err: InvalidPeriod) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": field,
        "value": err.value,
        "code": "invalid_period",
    }))
}

/// Validate an optional period field.
pub(crate) fn parse_period(field: &str, raw: Option<i64>) -> Result<Option<Period>, Error> {
    raw.map(|hours| Period::new(hours).map_err(|err| invalid_period(field, err)))
        .transpose()
}

/// Validate a required period field.
pub(crate) fn require_period(field: &str, raw: Option<i64>) -> Result<Period, Error> {
    parse_period(field, raw)?
        .ok_or_else(|| field_error(field, "missing_field", format!("{field} is required")))
}

/// Parse a subscription id taken from a URL path.
///
/// Anything that is not a UUID cannot name a subscription, so it is reported
/// as `not_found` rather than a validation error.
pub(crate) fn parse_subscription_id(raw: &str) -> Result<SubscriptionId, Error> {
    Uuid::parse_str(raw)
        .map(SubscriptionId::from_uuid)
        .map_err(|_| Error::not_found("subscription not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(None, None)]
    #[case(Some(6), Some(6))]
    fn optional_period_accepts_absent_or_valid(
        #[case] raw: Option<i64>,
        #[case] expected: Option<u32>,
    ) {
        let parsed = parse_period("period", raw).expect("valid");
        assert_eq!(parsed.map(Period::hours), expected);
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    #[case(9_000)]
    fn out_of_range_period_names_the_field(#[case] hours: i64) {
        let err = parse_period("period", Some(hours)).expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details["field"], "period");
        assert_eq!(details["code"], "invalid_period");
        assert_eq!(details["value"], hours);
    }

    #[rstest]
    fn required_period_reports_missing_field() {
        let err = require_period("period", None).expect_err("missing");
        assert_eq!(err.details().expect("details")["code"], "missing_field");
    }

    #[rstest]
    #[case("42")]
    #[case("not-a-uuid")]
    fn malformed_subscription_ids_are_not_found(#[case] raw: &str) {
        let err = parse_subscription_id(raw).expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
