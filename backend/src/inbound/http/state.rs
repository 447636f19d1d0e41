//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    LoginService, RegistrationService, SubscriptionCommand, SubscriptionQuery, UsersQuery,
    WeatherQuery,
};

/// Parameter object bundling the port implementations handlers need.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
    pub users: Arc<dyn UsersQuery>,
    pub subscriptions: Arc<dyn SubscriptionCommand>,
    pub subscriptions_query: Arc<dyn SubscriptionQuery>,
    pub weather: Arc<dyn WeatherQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
    pub users: Arc<dyn UsersQuery>,
    pub subscriptions: Arc<dyn SubscriptionCommand>,
    pub subscriptions_query: Arc<dyn SubscriptionQuery>,
    pub weather: Arc<dyn WeatherQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use weather_reminder::inbound::http::state::{HttpState, HttpStatePorts};
    /// use weather_reminder::test_support::InMemoryApp;
    ///
    /// let app = InMemoryApp::new();
    /// let state = HttpState::new(app.ports());
    /// let _login = Arc::clone(&state.login);
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            registration,
            users,
            subscriptions,
            subscriptions_query,
            weather,
        } = ports;
        Self {
            login,
            registration,
            users,
            subscriptions,
            subscriptions_query,
            weather,
        }
    }
}
