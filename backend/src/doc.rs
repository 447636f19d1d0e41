//! OpenAPI document served by Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, ReportFlags, User};
use crate::inbound::http::accounts::{LoginRequest, RegisterRequest};
use crate::inbound::http::dashboard::{
    ChangePeriodForm, CreateSubscriptionForm, DashboardAction, DashboardView, SubscriptionView,
};
use crate::inbound::http::forms::{FieldKind, FormDescriptor, FormField};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Private session cookie issued by POST /login.",
            ))),
        );
    }
}

/// OpenAPI document for the HTTP surface.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Weather reminder API",
        description = "Accounts, weather subscriptions and on-demand conditions."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::accounts::login_page,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::register_page,
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::dashboard::index,
        crate::inbound::http::dashboard::dashboard,
        crate::inbound::http::dashboard::dashboard_action,
        crate::inbound::http::subscriptions::condition,
        crate::inbound::http::subscriptions::change_attr,
        crate::inbound::http::subscriptions::delete,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        ReportFlags,
        LoginRequest,
        RegisterRequest,
        FormDescriptor,
        FormField,
        FieldKind,
        DashboardView,
        SubscriptionView,
        DashboardAction,
        CreateSubscriptionForm,
        ChangePeriodForm,
    )),
    tags(
        (name = "accounts", description = "Registration and sign-in"),
        (name = "dashboard", description = "Per-user subscription overview"),
        (name = "subscriptions", description = "Per-subscription actions"),
        (name = "health", description = "Orchestrator health checks")
    )
)]
pub struct ApiDoc;
