//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, test, web};

use super::session::SessionContext;
use super::state::{HttpState, HttpStatePorts};
use crate::domain::ports::{
    MockLoginService, MockRegistrationService, MockSubscriptionCommand, MockSubscriptionQuery,
    MockUsersQuery, MockWeatherQuery,
};
use crate::domain::{EmailAddress, Error, User, UserId, Username};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the `session` cookie set by a response.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Mock ports with no expectations; tests set the ones they exercise.
#[derive(Default)]
pub struct MockPorts {
    pub login: MockLoginService,
    pub registration: MockRegistrationService,
    pub users: MockUsersQuery,
    pub subscriptions: MockSubscriptionCommand,
    pub subscriptions_query: MockSubscriptionQuery,
    pub weather: MockWeatherQuery,
}

impl MockPorts {
    /// Wrap the mocks into handler state.
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(HttpStatePorts {
            login: Arc::new(self.login),
            registration: Arc::new(self.registration),
            users: Arc::new(self.users),
            subscriptions: Arc::new(self.subscriptions),
            subscriptions_query: Arc::new(self.subscriptions_query),
            weather: Arc::new(self.weather),
        }))
    }
}

/// Fixture user `ada`.
pub fn ada() -> User {
    User {
        id: UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("fixture id"),
        username: Username::new("ada").expect("fixture username"),
        email: EmailAddress::new("ada@example.com").expect("fixture email"),
        is_active: true,
    }
}

/// Path of the test-only sign-in route registered by [`with_test_sign_in`].
pub const TEST_SIGN_IN_PATH: &str = "/test/sign-in";

async fn test_sign_in(session: SessionContext) -> Result<HttpResponse, Error> {
    session.persist_user(&ada())?;
    Ok(HttpResponse::Ok().finish())
}

/// Register a route that signs in as [`ada`] without touching any port.
pub fn with_test_sign_in(cfg: &mut web::ServiceConfig) {
    cfg.route(TEST_SIGN_IN_PATH, web::post().to(test_sign_in));
}

/// Sign in as [`ada`] and return the session cookie.
pub async fn sign_in<S, B>(app: &S) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let response = test::call_service(
        app,
        test::TestRequest::post().uri(TEST_SIGN_IN_PATH).to_request(),
    )
    .await;
    session_cookie(&response)
}
