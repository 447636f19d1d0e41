//! OpenWeather and Nominatim adapters against a stubbed HTTP server.

use std::time::Duration;

use reqwest::Url;
use rstest::rstest;
use serde_json::json;
use weather_reminder::domain::ports::{
    Geocoder, GeocodingError, WeatherSource, WeatherSourceError,
};
use weather_reminder::domain::{CityName, Coordinates};
use weather_reminder::outbound::nominatim::NominatimGeocoder;
use weather_reminder::outbound::openweather::OpenWeatherHttpSource;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(2);

fn endpoint(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{route}", server.uri())).expect("stub url")
}

fn kyiv() -> Coordinates {
    Coordinates::new(50.45, 30.52).expect("valid coordinates")
}

#[rstest]
#[tokio::test]
async fn openweather_returns_payload_verbatim() {
    let server = MockServer::start().await;
    let payload = json!({ "main": { "temp": 18.5, "humidity": 60 }, "name": "Kyiv" });
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "50.45"))
        .and(query_param("lon", "30.52"))
        .and(query_param("appid", "secret"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let source =
        OpenWeatherHttpSource::new(endpoint(&server, "/data/2.5/weather"), "secret", TIMEOUT)
            .expect("client builds");

    assert_eq!(source.current(&kyiv()).await.expect("payload"), payload);
}

#[rstest]
#[case(429, "rate_limited")]
#[case(401, "invalid_request")]
#[case(503, "transport")]
#[case(504, "timeout")]
#[tokio::test]
async fn openweather_classifies_error_statuses(#[case] status: u16, #[case] expected: &str) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status).set_body_string("{\"cod\": 0}"))
        .mount(&server)
        .await;
    let source = OpenWeatherHttpSource::new(endpoint(&server, "/weather"), "secret", TIMEOUT)
        .expect("client builds");

    let error = source.current(&kyiv()).await.expect_err("status is an error");

    let kind = match error {
        WeatherSourceError::RateLimited { .. } => "rate_limited",
        WeatherSourceError::InvalidRequest { .. } => "invalid_request",
        WeatherSourceError::Transport { .. } => "transport",
        WeatherSourceError::Timeout { .. } => "timeout",
        WeatherSourceError::Decode { .. } => "decode",
    };
    assert_eq!(kind, expected);
}

#[rstest]
#[tokio::test]
async fn openweather_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    let source = OpenWeatherHttpSource::new(
        endpoint(&server, "/weather"),
        "secret",
        Duration::from_millis(50),
    )
    .expect("client builds");

    assert!(matches!(
        source.current(&kyiv()).await,
        Err(WeatherSourceError::Timeout { .. })
    ));
}

#[rstest]
#[tokio::test]
async fn nominatim_sends_user_agent_and_picks_first_match() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Kyiv"))
        .and(query_param("format", "json"))
        .and(query_param("limit", "1"))
        .and(header("user-agent", "weather-reminder-tests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "lat": "50.4500336", "lon": "30.5241361", "display_name": "Kyiv, Ukraine" }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    let geocoder = NominatimGeocoder::new(
        endpoint(&server, "/search"),
        "weather-reminder-tests",
        TIMEOUT,
    )
    .expect("client builds");

    let coordinates = geocoder
        .locate(&CityName::new("Kyiv").expect("city"))
        .await
        .expect("lookup succeeds")
        .expect("city is known");

    assert!((coordinates.longitude() - 30.524_136_1).abs() < 1e-9);
}

#[rstest]
#[tokio::test]
async fn nominatim_empty_result_is_unknown_city() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    let geocoder = NominatimGeocoder::new(endpoint(&server, "/search"), "tests", TIMEOUT)
        .expect("client builds");

    let located = geocoder
        .locate(&CityName::new("Atlantis").expect("city"))
        .await
        .expect("lookup succeeds");

    assert_eq!(located, None);
}

#[rstest]
#[tokio::test]
async fn nominatim_throttling_maps_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    let geocoder = NominatimGeocoder::new(endpoint(&server, "/search"), "tests", TIMEOUT)
        .expect("client builds");

    assert!(matches!(
        geocoder.locate(&CityName::new("Kyiv").expect("city")).await,
        Err(GeocodingError::RateLimited { .. })
    ));
}
