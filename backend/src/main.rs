//! Backend entry-point: loads settings, runs migrations, starts the HTTP
//! server and the background weather and dispatch jobs.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use mockable::{DefaultClock, DefaultEnv};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use weather_reminder::inbound::http::health::HealthState;
use weather_reminder::inbound::http::session_config::{BuildMode, session_settings_from_env};
use weather_reminder::inbound::jobs::{
    DispatchJob, RefreshJob, spawn_periodic, spawn_refresh_worker,
};
use weather_reminder::outbound::persistence::{DbPool, run_pending_migrations};
use weather_reminder::outbound::queue::refresh_channel;
use weather_reminder::settings::AppSettings;

use server::{ServerConfig, Tuning, build_live_adapters, build_services, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("load settings")?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("configure sessions")?;
    let config = ServerConfig::new(session, settings.bind_addr()?);

    let applied = run_pending_migrations(settings.database_url()?)
        .await
        .wrap_err("run database migrations")?;
    info!(applied, "database migrations applied");
    let pool = DbPool::new(settings.pool_config()?)
        .await
        .wrap_err("connect database pool")?;

    let (queue, refresh_jobs) = refresh_channel();
    let adapters = build_live_adapters(&settings, &pool, queue)?;
    let tuning = Tuning {
        freshness: settings.freshness_policy()?,
        selection: settings.due_selection()?,
    };
    let services = build_services(adapters, Arc::new(DefaultClock), tuning);

    let worker = spawn_refresh_worker(refresh_jobs, services.weather_refresh.clone());
    let refresh = spawn_periodic(
        Arc::new(RefreshJob::new(services.weather_refresh.clone())),
        settings.refresh_interval()?,
    );
    let dispatch = spawn_periodic(
        Arc::new(DispatchJob::new(services.dispatch.clone())),
        settings.dispatch_interval()?,
    );

    let health_state = web::Data::new(HealthState::new());
    info!(bind_addr = %config.bind_addr(), "starting HTTP server");
    let server = create_server(health_state.clone(), services.http_state, config)?;
    let outcome = server.await;

    health_state.mark_unhealthy();
    refresh.shutdown().await;
    dispatch.shutdown().await;
    worker.abort();
    info!("shutdown complete");
    outcome.wrap_err("HTTP server failed")
}
