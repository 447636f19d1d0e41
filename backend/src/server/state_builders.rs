//! Builders wiring outbound adapters into domain services and HTTP state.

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use mockable::Clock;

use weather_reminder::domain::ports::{
    CityRepository, ForecastDispatch, Geocoder, Mailer, PasswordHasher, RefreshQueue,
    SubscriptionRepository, UserRepository, WeatherCacheRepository, WeatherRefresh,
    WeatherSource,
};
use weather_reminder::domain::{
    AccountService, DueSelection, ForecastDispatchService, FreshnessPolicy, SubscriptionService,
    WeatherPorts, WeatherService,
};
use weather_reminder::inbound::http::state::{HttpState, HttpStatePorts};
use weather_reminder::outbound::mail::SmtpMailer;
use weather_reminder::outbound::nominatim::NominatimGeocoder;
use weather_reminder::outbound::openweather::OpenWeatherHttpSource;
use weather_reminder::outbound::persistence::{
    DbPool, DieselCityRepository, DieselSubscriptionRepository, DieselUserRepository,
    DieselWeatherCacheRepository,
};
use weather_reminder::outbound::queue::TokioRefreshQueue;
use weather_reminder::outbound::security::Argon2PasswordHasher;
use weather_reminder::settings::AppSettings;

/// Driven adapters the services are assembled from.
pub(crate) struct Adapters<U, C, S, W, G, H, M> {
    pub users: Arc<U>,
    pub cities: Arc<C>,
    pub subscriptions: Arc<S>,
    pub weather_cache: Arc<W>,
    pub geocoder: Arc<G>,
    pub hasher: Arc<H>,
    pub mailer: Arc<M>,
    pub weather_source: Arc<dyn WeatherSource>,
    pub queue: Arc<dyn RefreshQueue>,
}

/// Production adapter set.
pub(crate) type LiveAdapters = Adapters<
    DieselUserRepository,
    DieselCityRepository,
    DieselSubscriptionRepository,
    DieselWeatherCacheRepository,
    NominatimGeocoder,
    Argon2PasswordHasher,
    SmtpMailer,
>;

/// Scheduling knobs applied to the weather and dispatch services.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Tuning {
    pub freshness: FreshnessPolicy,
    pub selection: DueSelection,
}

/// Everything the HTTP server and background jobs drive.
#[derive(Clone)]
pub(crate) struct Services {
    pub http_state: web::Data<HttpState>,
    pub weather_refresh: Arc<dyn WeatherRefresh>,
    pub dispatch: Arc<dyn ForecastDispatch>,
}

/// Build the production adapters from settings and a connected pool.
///
/// # Errors
/// Fails when a setting is missing or invalid, or an HTTP or SMTP client
/// cannot be constructed.
pub(crate) fn build_live_adapters(
    settings: &AppSettings,
    pool: &DbPool,
    queue: TokioRefreshQueue,
) -> Result<LiveAdapters> {
    let timeout = settings.http_timeout();
    let weather_source = OpenWeatherHttpSource::new(
        settings.openweather_endpoint()?,
        settings.openweather_api_key()?,
        timeout,
    )
    .wrap_err("build OpenWeather client")?;
    let geocoder = NominatimGeocoder::new(
        settings.nominatim_endpoint()?,
        settings.geocoder_user_agent(),
        timeout,
    )
    .wrap_err("build Nominatim client")?;
    let mailer = SmtpMailer::new(&settings.smtp_settings()?).wrap_err("build SMTP transport")?;

    Ok(Adapters {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        cities: Arc::new(DieselCityRepository::new(pool.clone())),
        subscriptions: Arc::new(DieselSubscriptionRepository::new(pool.clone())),
        weather_cache: Arc::new(DieselWeatherCacheRepository::new(pool.clone())),
        geocoder: Arc::new(geocoder),
        hasher: Arc::new(Argon2PasswordHasher::default()),
        mailer: Arc::new(mailer),
        weather_source: Arc::new(weather_source),
        queue: Arc::new(queue),
    })
}

/// Assemble domain services over `adapters`.
pub(crate) fn build_services<U, C, S, W, G, H, M>(
    adapters: Adapters<U, C, S, W, G, H, M>,
    clock: Arc<dyn Clock>,
    tuning: Tuning,
) -> Services
where
    U: UserRepository + 'static,
    C: CityRepository + 'static,
    S: SubscriptionRepository + 'static,
    W: WeatherCacheRepository + 'static,
    G: Geocoder + 'static,
    H: PasswordHasher + 'static,
    M: Mailer + 'static,
{
    let Adapters {
        users,
        cities,
        subscriptions,
        weather_cache,
        geocoder,
        hasher,
        mailer,
        weather_source,
        queue,
    } = adapters;

    let accounts = Arc::new(AccountService::new(users, hasher));
    let subscription_service = Arc::new(SubscriptionService::new(
        Arc::clone(&subscriptions),
        Arc::clone(&cities),
        geocoder,
        Arc::clone(&clock),
    ));
    let weather = Arc::new(
        WeatherService::new(
            WeatherPorts {
                source: weather_source,
                cache: weather_cache.clone(),
                cities,
                subscriptions: subscriptions.clone(),
                queue,
            },
            Arc::clone(&clock),
        )
        .with_policy(tuning.freshness),
    );
    let dispatch = Arc::new(
        ForecastDispatchService::new(subscriptions, mailer, weather_cache, clock)
            .with_selection(tuning.selection),
    );

    let http_state = web::Data::new(HttpState::new(HttpStatePorts {
        login: accounts.clone(),
        registration: accounts.clone(),
        users: accounts,
        subscriptions: subscription_service.clone(),
        subscriptions_query: subscription_service,
        weather: weather.clone(),
    }));

    Services {
        http_state,
        weather_refresh: weather,
        dispatch,
    }
}
