//! Per-subscription endpoints.
//!
//! ```text
//! GET  /subscription/<id>/condition            -> current weather JSON
//! POST /subscription/<id>/change_attr/<attr>   -> 303 dashboard (or / for unknown attr)
//! POST /subscription/<id>/delete               -> 303 dashboard
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::{Error, ReportField};
use crate::inbound::http::ApiResult;
use crate::inbound::http::redirect::{INDEX_PATH, dashboard_path, see_other};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_subscription_id;

/// Current weather for the subscription's city.
///
/// Serves the cached payload while it is under an hour old; otherwise the
/// provider is queried and the cache refreshed. No session is required.
#[utoipa::path(
    get,
    path = "/subscription/{id}/condition",
    params(("id" = String, Path, description = "Subscription id")),
    responses(
        (status = 200, description = "Provider weather payload", body = Object),
        (status = 404, description = "Unknown subscription", body = Error),
        (status = 500, description = "Weather provider failed and nothing is cached", body = Error)
    ),
    tags = ["subscriptions"],
    operation_id = "subscriptionCondition",
    security([])
)]
#[get("/subscription/{id}/condition")]
pub async fn condition(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Value>> {
    let id = parse_subscription_id(&path)?;
    let payload = state.weather.current_for_subscription(&id).await?;
    Ok(web::Json(payload))
}

/// Flip one boolean attribute of a subscription.
///
/// Unknown attribute names change nothing and redirect to the index.
#[utoipa::path(
    post,
    path = "/subscription/{id}/change_attr/{attr}",
    params(
        ("id" = String, Path, description = "Subscription id"),
        ("attr" = String, Path, description = "Attribute to toggle, e.g. `humidity` or `is_active`")
    ),
    responses(
        (status = 303, description = "Toggled (or unknown attribute ignored)"),
        (status = 401, description = "Not signed in or not the owner", body = Error),
        (status = 404, description = "Unknown subscription", body = Error)
    ),
    tags = ["subscriptions"],
    operation_id = "toggleSubscriptionAttribute"
)]
#[post("/subscription/{id}/change_attr/{attr}")]
pub async fn change_attr(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let user = session.require_user()?;
    let (raw_id, raw_attr) = path.into_inner();
    let field = match raw_attr.parse::<ReportField>() {
        Ok(field) => field,
        Err(err) => {
            debug!(error = %err, "ignoring toggle of unknown attribute");
            return Ok(see_other(INDEX_PATH));
        }
    };
    let id = parse_subscription_id(&raw_id)?;
    let updated = state.subscriptions.toggle(&user.id, &id, field).await?;
    debug!(subscription_id = %updated.id, %field, "subscription attribute toggled");
    Ok(see_other(dashboard_path(&user.username)))
}

/// Delete a subscription the signed-in user owns.
#[utoipa::path(
    post,
    path = "/subscription/{id}/delete",
    params(("id" = String, Path, description = "Subscription id")),
    responses(
        (status = 303, description = "Deleted"),
        (status = 401, description = "Not signed in or not the owner", body = Error),
        (status = 404, description = "Unknown or already deleted subscription", body = Error)
    ),
    tags = ["subscriptions"],
    operation_id = "deleteSubscription"
)]
#[post("/subscription/{id}/delete")]
pub async fn delete(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = session.require_user()?;
    let id = parse_subscription_id(&path)?;
    state.subscriptions.delete(&user.id, &id).await?;
    info!(user_id = %user.id, subscription_id = %id, "subscription deleted");
    Ok(see_other(dashboard_path(&user.username)))
}
