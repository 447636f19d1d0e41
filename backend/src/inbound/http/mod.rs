//! HTTP inbound adapter: accounts, dashboard, subscriptions and health checks.

pub mod accounts;
pub mod dashboard;
pub mod error;
pub mod forms;
pub mod health;
pub mod redirect;
pub mod session;
pub mod session_config;
pub mod state;
pub mod subscriptions;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use crate::domain::ApiResult;

use actix_web::web;

/// Register the session-backed site routes.
///
/// Probes are left out; they must answer without a session cookie.
///
/// ```text
/// GET  /                                  GET  /login    POST /login
/// GET  /user/{username}                   GET  /register POST /register
/// POST /user/{username}                   GET  /logout
/// GET  /subscription/{id}/condition
/// POST /subscription/{id}/change_attr/{attr}
/// POST /subscription/{id}/delete
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(dashboard::index)
        .service(accounts::login_page)
        .service(accounts::login)
        .service(accounts::register_page)
        .service(accounts::register)
        .service(accounts::logout)
        .service(dashboard::dashboard)
        .service(dashboard::dashboard_action)
        .service(subscriptions::condition)
        .service(subscriptions::change_attr)
        .service(subscriptions::delete);
}
