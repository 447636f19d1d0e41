//! Tests for the subscription service.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ports::{MockCityRepository, MockGeocoder, MockSubscriptionRepository};
use crate::domain::test_fixtures::{at, city, clock_at, subscription_for};
use crate::domain::{Coordinates, ErrorCode, ReportFlags};

type Service = SubscriptionService<MockSubscriptionRepository, MockCityRepository, MockGeocoder>;

fn make_service(
    subscriptions: MockSubscriptionRepository,
    cities: MockCityRepository,
    geocoder: MockGeocoder,
) -> Service {
    SubscriptionService::new(
        Arc::new(subscriptions),
        Arc::new(cities),
        Arc::new(geocoder),
        clock_at(at(1, 10, 15)),
    )
}

fn request(user_id: UserId, city: &str) -> CreateSubscriptionRequest {
    CreateSubscriptionRequest {
        user_id,
        city: CityName::new(city).expect("valid city"),
        period: None,
        flags: ReportFlags::default(),
    }
}

#[rstest]
#[tokio::test]
async fn create_reuses_known_city_without_geocoding() {
    let user_id = UserId::random();
    let known = city("Kyiv");
    let known_id = known.id;
    let mut subscriptions = MockSubscriptionRepository::new();
    subscriptions
        .expect_list_for_user()
        .return_once(|_| Ok(Vec::new()));
    subscriptions
        .expect_insert_within_limit()
        .withf(move |s, limit| s.city.id == known_id && *limit == SUBSCRIPTION_LIMIT)
        .times(1)
        .return_once(|_, _| Ok(()));
    let mut cities = MockCityRepository::new();
    cities
        .expect_find_by_name()
        .return_once(move |_| Ok(Some(known)));
    let mut geocoder = MockGeocoder::new();
    geocoder.expect_locate().never();

    let created = make_service(subscriptions, cities, geocoder)
        .create(request(user_id, "Kyiv"))
        .await
        .expect("subscription created");
    assert_eq!(created.period.hours(), 6);
    assert_eq!(created.next_message, at(1, 16, 0));
    assert!(created.is_active);
}

#[rstest]
#[tokio::test]
async fn create_geocodes_and_stores_new_city() {
    let mut subscriptions = MockSubscriptionRepository::new();
    subscriptions
        .expect_list_for_user()
        .return_once(|_| Ok(Vec::new()));
    subscriptions
        .expect_insert_within_limit()
        .return_once(|_, _| Ok(()));
    let mut cities = MockCityRepository::new();
    cities.expect_find_by_name().return_once(|_| Ok(None));
    cities
        .expect_insert_or_get()
        .withf(|c| c.name.as_ref() == "Lviv" && c.coordinates.latitude() == 49.84)
        .times(1)
        .returning(|c| Ok(c.clone()));
    let mut geocoder = MockGeocoder::new();
    geocoder
        .expect_locate()
        .times(1)
        .return_once(|_| Ok(Some(Coordinates::new(49.84, 24.03).expect("valid"))));

    let created = make_service(subscriptions, cities, geocoder)
        .create(request(UserId::random(), "Lviv"))
        .await
        .expect("subscription created");
    assert_eq!(created.city.name.as_ref(), "Lviv");
}

#[rstest]
#[tokio::test]
async fn create_rejects_unknown_city_without_storing_it() {
    let mut subscriptions = MockSubscriptionRepository::new();
    subscriptions
        .expect_list_for_user()
        .return_once(|_| Ok(Vec::new()));
    subscriptions.expect_insert_within_limit().never();
    let mut cities = MockCityRepository::new();
    cities.expect_find_by_name().return_once(|_| Ok(None));
    cities.expect_insert_or_get().never();
    let mut geocoder = MockGeocoder::new();
    geocoder.expect_locate().return_once(|_| Ok(None));

    let err = make_service(subscriptions, cities, geocoder)
        .create(request(UserId::random(), "Atlantis"))
        .await
        .expect_err("unknown city");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn create_reports_geocoder_outage() {
    let mut subscriptions = MockSubscriptionRepository::new();
    subscriptions
        .expect_list_for_user()
        .return_once(|_| Ok(Vec::new()));
    let mut cities = MockCityRepository::new();
    cities.expect_find_by_name().return_once(|_| Ok(None));
    cities.expect_insert_or_get().never();
    let mut geocoder = MockGeocoder::new();
    geocoder
        .expect_locate()
        .return_once(|_| Err(GeocodingError::timeout("10s elapsed")));

    let err = make_service(subscriptions, cities, geocoder)
        .create(request(UserId::random(), "Kyiv"))
        .await
        .expect_err("geocoder down");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn create_refuses_sixth_subscription() {
    let user_id = UserId::random();
    let existing: Vec<_> = ["A", "B", "C", "D", "E"]
        .into_iter()
        .map(|name| subscription_for(user_id, name, at(1, 9, 0)))
        .collect();
    let mut subscriptions = MockSubscriptionRepository::new();
    subscriptions
        .expect_list_for_user()
        .return_once(move |_| Ok(existing));
    subscriptions.expect_insert_within_limit().never();
    let mut cities = MockCityRepository::new();
    cities.expect_find_by_name().never();

    let err = make_service(subscriptions, cities, MockGeocoder::new())
        .create(request(user_id, "Kyiv"))
        .await
        .expect_err("limit reached");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn create_refuses_duplicate_city() {
    let user_id = UserId::random();
    let existing = vec![subscription_for(user_id, "Kyiv", at(1, 9, 0))];
    let mut subscriptions = MockSubscriptionRepository::new();
    subscriptions
        .expect_list_for_user()
        .return_once(move |_| Ok(existing));

    let err = make_service(subscriptions, MockCityRepository::new(), MockGeocoder::new())
        .create(request(user_id, "Kyiv"))
        .await
        .expect_err("duplicate");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn create_maps_racing_limit_from_store() {
    let mut subscriptions = MockSubscriptionRepository::new();
    subscriptions
        .expect_list_for_user()
        .return_once(|_| Ok(Vec::new()));
    subscriptions
        .expect_insert_within_limit()
        .return_once(|_, limit| Err(SubscriptionPersistenceError::limit_reached(limit)));
    let mut cities = MockCityRepository::new();
    let known = city("Kyiv");
    cities
        .expect_find_by_name()
        .return_once(move |_| Ok(Some(known)));

    let err = make_service(subscriptions, cities, MockGeocoder::new())
        .create(request(UserId::random(), "Kyiv"))
        .await
        .expect_err("limit reached");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn toggle_persists_flipped_flag() {
    let user_id = UserId::random();
    let stored = subscription_for(user_id, "Kyiv", at(1, 9, 0));
    let id = stored.id;
    let mut subscriptions = MockSubscriptionRepository::new();
    subscriptions
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));
    subscriptions
        .expect_update()
        .withf(|s| s.flags.humidity)
        .times(1)
        .return_once(|_| Ok(()));

    let updated = make_service(subscriptions, MockCityRepository::new(), MockGeocoder::new())
        .toggle(&user_id, &id, ReportField::Humidity)
        .await
        .expect("toggle succeeds");
    assert!(updated.flags.humidity);
}

#[rstest]
#[tokio::test]
async fn mutations_reject_other_users() {
    let stored = subscription_for(UserId::random(), "Kyiv", at(1, 9, 0));
    let id = stored.id;
    let mut subscriptions = MockSubscriptionRepository::new();
    subscriptions
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));
    subscriptions.expect_update().never();
    subscriptions.expect_delete().never();

    let err = make_service(subscriptions, MockCityRepository::new(), MockGeocoder::new())
        .delete(&UserId::random(), &id)
        .await
        .expect_err("not the owner");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn delete_of_missing_subscription_is_not_found() {
    let mut subscriptions = MockSubscriptionRepository::new();
    subscriptions.expect_find_by_id().return_once(|_| Ok(None));

    let err = make_service(subscriptions, MockCityRepository::new(), MockGeocoder::new())
        .delete(&UserId::random(), &SubscriptionId::random())
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn change_period_applies_save_rule() {
    let user_id = UserId::random();
    let mut stored = subscription_for(user_id, "Kyiv", at(1, 9, 0));
    stored.next_message = at(1, 8, 0);
    let id = stored.id;
    let mut subscriptions = MockSubscriptionRepository::new();
    subscriptions
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));
    subscriptions.expect_update().return_once(|_| Ok(()));

    let updated = make_service(subscriptions, MockCityRepository::new(), MockGeocoder::new())
        .change_period(&user_id, &id, Period::new(3).expect("valid"))
        .await
        .expect("period changed");
    assert_eq!(updated.period.hours(), 3);
    assert_eq!(updated.next_message, at(1, 13, 0));
}
