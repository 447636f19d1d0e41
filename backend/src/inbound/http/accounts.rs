//! Account handlers: sign-in, sign-up and sign-out.
//!
//! ```text
//! GET  /login      -> form descriptor
//! POST /login      {"username":"ada","password":"rainy-day"} -> 303 /
//! GET  /register   -> form descriptor
//! POST /register   {"username","email","password1","password2"} -> 303 /login
//! GET  /logout     -> 303 /login
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{
    Error, LoginCredentials, LoginValidationError, Registration, RegistrationValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::forms::{FormDescriptor, login_form, register_form};
use crate::inbound::http::redirect::{INDEX_PATH, LOGIN_PATH, see_other};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::field_error;

/// Login request body for `POST /login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Registration request body for `POST /register`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = RegistrationValidationError;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            &value.username,
            &value.email,
            &value.password1,
            &value.password2,
        )
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => {
            field_error("username", "empty_username", "username must not be empty")
        }
        LoginValidationError::EmptyPassword => {
            field_error("password", "empty_password", "password must not be empty")
        }
    }
}

fn map_registration_validation_error(err: RegistrationValidationError) -> Error {
    let code = match &err {
        RegistrationValidationError::Username(_) => "invalid_username",
        RegistrationValidationError::Email(_) => "invalid_email",
        RegistrationValidationError::PasswordMismatch => "password_mismatch",
        RegistrationValidationError::PasswordTooShort { .. } => "password_too_short",
        RegistrationValidationError::PasswordEntirelyNumeric => "password_entirely_numeric",
    };
    field_error(err.field(), code, err.to_string())
}

/// Describe the sign-in form.
#[utoipa::path(
    get,
    path = "/login",
    responses((status = 200, description = "Sign-in form", body = FormDescriptor)),
    tags = ["accounts"],
    operation_id = "loginForm",
    security([])
)]
#[get("/login")]
pub async fn login_page() -> web::Json<FormDescriptor> {
    web::Json(login_form())
}

/// Authenticate and establish a session, then redirect to the index.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 303, description = "Signed in", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user = state.login.authenticate(&credentials).await?;
    session.persist_user(&user)?;
    info!(user_id = %user.id, "user signed in");
    Ok(see_other(INDEX_PATH))
}

/// Describe the sign-up form.
#[utoipa::path(
    get,
    path = "/register",
    responses((status = 200, description = "Sign-up form", body = FormDescriptor)),
    tags = ["accounts"],
    operation_id = "registerForm",
    security([])
)]
#[get("/register")]
pub async fn register_page() -> web::Json<FormDescriptor> {
    web::Json(register_form())
}

/// Create an account, then redirect to the sign-in page.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 303, description = "Account created"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username taken", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(payload.into_inner())
        .map_err(map_registration_validation_error)?;
    let user = state.registration.register(&registration).await?;
    info!(user_id = %user.id, "account registered");
    Ok(see_other(LOGIN_PATH))
}

/// End the session and redirect to the sign-in page.
#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 303, description = "Signed out"),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "logout"
)]
#[get("/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    let user = session.require_user()?;
    session.clear();
    info!(user_id = %user.id, "user signed out");
    Ok(see_other(LOGIN_PATH))
}

#[cfg(test)]
mod tests;
