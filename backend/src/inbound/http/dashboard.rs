//! Index redirect and per-user dashboard.
//!
//! ```text
//! GET  /                 -> 303 /user/<username> or /login
//! GET  /user/<username>  -> dashboard JSON (owner only)
//! POST /user/<username>  {"action":"create_subscription","city":"Kyiv","period":6}
//! POST /user/<username>  {"action":"change_period","subscription_id":"...","period":3}
//! ```
//!
//! Request bodies use the same snake_case names as the form descriptor.

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::CreateSubscriptionRequest;
use crate::domain::{City, CityName, Error, ReportFlags, Subscription, User, Username};
use crate::inbound::http::ApiResult;
use crate::inbound::http::forms::{FormDescriptor, create_subscription_form};
use crate::inbound::http::redirect::{LOGIN_PATH, dashboard_path, see_other};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    field_error, parse_period, parse_subscription_id, require_period,
};

/// Subscription as shown on the dashboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionView {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub city: City,
    /// Hours between two forecasts.
    pub period: u32,
    pub next_message: DateTime<Utc>,
    pub is_active: bool,
    #[serde(flatten)]
    pub flags: ReportFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Subscription> for SubscriptionView {
    fn from(s: Subscription) -> Self {
        Self {
            id: s.id.to_string(),
            city: s.city,
            period: s.period.hours(),
            next_message: s.next_message,
            is_active: s.is_active,
            flags: s.flags,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Dashboard payload for `GET /user/<username>`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardView {
    pub user: User,
    /// Ordered by city name.
    pub subscriptions: Vec<SubscriptionView>,
    pub form: FormDescriptor,
}

/// Fields of the create-subscription form. Unset flags keep their defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateSubscriptionForm {
    pub city: String,
    pub period: Option<i64>,
    pub temperature: Option<bool>,
    pub precipitation: Option<bool>,
    pub cloudiness: Option<bool>,
    pub humidity: Option<bool>,
    pub wind: Option<bool>,
    pub wind_speed: Option<bool>,
    pub pressure: Option<bool>,
    pub feels_like: Option<bool>,
}

impl CreateSubscriptionForm {
    fn flags(&self) -> ReportFlags {
        let defaults = ReportFlags::default();
        ReportFlags {
            temperature: self.temperature.unwrap_or(defaults.temperature),
            precipitation: self.precipitation.unwrap_or(defaults.precipitation),
            cloudiness: self.cloudiness.unwrap_or(defaults.cloudiness),
            humidity: self.humidity.unwrap_or(defaults.humidity),
            wind: self.wind.unwrap_or(defaults.wind),
            wind_speed: self.wind_speed.unwrap_or(defaults.wind_speed),
            pressure: self.pressure.unwrap_or(defaults.pressure),
            feels_like: self.feels_like.unwrap_or(defaults.feels_like),
        }
    }
}

/// Fields of the change-period form.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ChangePeriodForm {
    pub subscription_id: String,
    pub period: Option<i64>,
}

/// Dashboard form submission, tagged by `action`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DashboardAction {
    CreateSubscription(CreateSubscriptionForm),
    ChangePeriod(ChangePeriodForm),
}

/// Resolve the dashboard owner and check the signed-in user is that owner.
async fn dashboard_owner(
    state: &HttpState,
    session: &SessionContext,
    raw_username: &str,
) -> Result<User, Error> {
    let signed_in = session.require_user()?;
    let not_found = || Error::not_found(format!("user '{raw_username}' not found"));
    let username = Username::new(raw_username).map_err(|_| not_found())?;
    let owner = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(not_found)?;
    if owner.id != signed_in.id {
        return Err(Error::unauthorized("dashboard belongs to another user"));
    }
    Ok(owner)
}

/// Redirect to the signed-in user's dashboard, or to sign-in.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 303, description = "Dashboard or sign-in page")),
    tags = ["dashboard"],
    operation_id = "index",
    security([])
)]
#[get("/")]
pub async fn index(session: SessionContext) -> ApiResult<HttpResponse> {
    Ok(match session.current_user()? {
        Some(user) => see_other(dashboard_path(&user.username)),
        None => see_other(LOGIN_PATH),
    })
}

/// Show the user's subscriptions and the create form.
#[utoipa::path(
    get,
    path = "/user/{username}",
    params(("username" = String, Path, description = "Dashboard owner")),
    responses(
        (status = 200, description = "Dashboard", body = DashboardView),
        (status = 401, description = "Not signed in or not the owner", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["dashboard"],
    operation_id = "dashboard"
)]
#[get("/user/{username}")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<DashboardView>> {
    let owner = dashboard_owner(&state, &session, &path).await?;
    let subscriptions = state
        .subscriptions_query
        .list_for_user(&owner.id)
        .await?
        .into_iter()
        .map(SubscriptionView::from)
        .collect();
    let form = create_subscription_form(dashboard_path(&owner.username));
    Ok(web::Json(DashboardView {
        user: owner,
        subscriptions,
        form,
    }))
}

/// Create a subscription or change a period, then redirect back.
#[utoipa::path(
    post,
    path = "/user/{username}",
    params(("username" = String, Path, description = "Dashboard owner")),
    request_body = DashboardAction,
    responses(
        (status = 303, description = "Saved; back to the dashboard"),
        (status = 400, description = "Invalid form or subscription limit reached", body = Error),
        (status = 401, description = "Not signed in or not the owner", body = Error),
        (status = 404, description = "Unknown user or subscription", body = Error),
        (status = 409, description = "Already subscribed to the city", body = Error),
        (status = 503, description = "Geocoder unavailable", body = Error)
    ),
    tags = ["dashboard"],
    operation_id = "dashboardAction"
)]
#[post("/user/{username}")]
pub async fn dashboard_action(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<DashboardAction>,
) -> ApiResult<HttpResponse> {
    let owner = dashboard_owner(&state, &session, &path).await?;
    match payload.into_inner() {
        DashboardAction::CreateSubscription(form) => {
            let city = CityName::new(&form.city)
                .map_err(|err| field_error("city", "invalid_city", err.to_string()))?;
            let request = CreateSubscriptionRequest {
                user_id: owner.id,
                city,
                period: parse_period("period", form.period)?,
                flags: form.flags(),
            };
            state.subscriptions.create(request).await?;
        }
        DashboardAction::ChangePeriod(form) => {
            let id = parse_subscription_id(&form.subscription_id)?;
            let period = require_period("period", form.period)?;
            state
                .subscriptions
                .change_period(&owner.id, &id, period)
                .await?;
        }
    }
    Ok(see_other(dashboard_path(&owner.username)))
}
