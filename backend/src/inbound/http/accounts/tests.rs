//! Tests for account handlers.

use super::*;
use crate::domain::ErrorCode;
use crate::inbound::http::test_utils::{MockPorts, ada, session_cookie, test_session_middleware};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde_json::Value;

fn test_app(
    ports: MockPorts,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(ports.into_state())
        .wrap(test_session_middleware())
        .service(login_page)
        .service(login)
        .service(register_page)
        .service(register)
        .service(logout)
}

fn location<B>(response: &actix_web::dev::ServiceResponse<B>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

async fn error_body<B: actix_web::body::MessageBody>(
    response: actix_web::dev::ServiceResponse<B>,
) -> Value {
    let body = actix_test::read_body(response).await;
    serde_json::from_slice(&body).expect("error payload")
}

#[rstest]
#[case("   ", "rainy-day", "username", "empty_username")]
#[case("ada", "", "password", "empty_password")]
#[actix_web::test]
async fn login_rejects_blank_fields(
    #[case] username: &str,
    #[case] password: &str,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = actix_test::init_service(test_app(MockPorts::default())).await;
    let request = actix_test::TestRequest::post()
        .uri("/login")
        .set_json(&LoginRequest {
            username: username.into(),
            password: password.into(),
        })
        .to_request();

    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value = error_body(response).await;
    assert_eq!(value["code"], "invalid_request");
    assert_eq!(value["details"]["field"], field);
    assert_eq!(value["details"]["code"], code);
}

#[actix_web::test]
async fn login_redirects_to_index_and_sets_session() {
    let mut ports = MockPorts::default();
    ports
        .login
        .expect_authenticate()
        .withf(|creds| creds.username() == "ada" && creds.password() == "rainy-day")
        .times(1)
        .return_once(|_| Ok(ada()));
    let app = actix_test::init_service(test_app(ports)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/login")
            .set_json(&LoginRequest {
                username: "ada".into(),
                password: "rainy-day".into(),
            })
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));
    let _cookie = session_cookie(&response);
}

#[actix_web::test]
async fn login_with_wrong_password_is_unauthorised() {
    let mut ports = MockPorts::default();
    ports
        .login
        .expect_authenticate()
        .return_once(|_| Err(Error::unauthorized("invalid credentials")));
    let app = actix_test::init_service(test_app(ports)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/login")
            .set_json(&LoginRequest {
                username: "ada".into(),
                password: "wrong-password".into(),
            })
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let value = error_body(response).await;
    assert_eq!(value["message"], "invalid credentials");
}

#[rstest]
#[case("login")]
#[case("register")]
#[actix_web::test]
async fn form_pages_describe_their_fields(#[case] page: &str) {
    let app = actix_test::init_service(test_app(MockPorts::default())).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/{page}"))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["name"], page);
    assert_eq!(value["method"], "POST");
    assert!(value["fields"].as_array().is_some_and(|f| !f.is_empty()));
}

fn register_request(password2: &str) -> RegisterRequest {
    RegisterRequest {
        username: "ada".into(),
        email: "ada@example.com".into(),
        password1: "rainy-day".into(),
        password2: password2.into(),
    }
}

#[actix_web::test]
async fn register_redirects_to_login() {
    let mut ports = MockPorts::default();
    ports
        .registration
        .expect_register()
        .withf(|r| r.username().as_ref() == "ada" && r.password() == "rainy-day")
        .times(1)
        .return_once(|_| Ok(ada()));
    let app = actix_test::init_service(test_app(ports)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/register")
            .set_json(register_request("rainy-day"))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}

#[actix_web::test]
async fn register_reports_mismatched_passwords_on_second_field() {
    let mut ports = MockPorts::default();
    ports.registration.expect_register().never();
    let app = actix_test::init_service(test_app(ports)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/register")
            .set_json(register_request("sunny-day"))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value = error_body(response).await;
    assert_eq!(value["details"]["field"], "password2");
    assert_eq!(value["details"]["code"], "password_mismatch");
}

#[actix_web::test]
async fn register_surfaces_duplicate_username_conflict() {
    let mut ports = MockPorts::default();
    ports
        .registration
        .expect_register()
        .return_once(|_| Err(Error::conflict("username 'ada' is already taken")));
    let app = actix_test::init_service(test_app(ports)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/register")
            .set_json(register_request("rainy-day"))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let value = error_body(response).await;
    assert_eq!(value["code"], "conflict");
}

#[actix_web::test]
async fn logout_requires_a_session() {
    let app = actix_test::init_service(test_app(MockPorts::default())).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/logout").to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn logout_clears_session_and_redirects() {
    let mut ports = MockPorts::default();
    ports
        .login
        .expect_authenticate()
        .return_once(|_| Ok(ada()));
    let app = actix_test::init_service(test_app(ports)).await;

    let login_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/login")
            .set_json(&LoginRequest {
                username: "ada".into(),
                password: "rainy-day".into(),
            })
            .to_request(),
    )
    .await;
    let cookie = session_cookie(&login_res);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/logout")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
    assert_eq!(session_cookie(&response).value(), "");
}

#[rstest]
fn registration_errors_map_to_their_field() {
    let err = map_registration_validation_error(
        RegistrationValidationError::PasswordTooShort { min: 8 },
    );
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    let details = err.details().expect("details");
    assert_eq!(details["field"], "password1");
    assert_eq!(details["code"], "password_too_short");
}
