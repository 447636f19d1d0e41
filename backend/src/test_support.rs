//! In-memory port adapters for integration tests.
//!
//! [`InMemoryApp`] wires the real domain services over these adapters, so
//! tests exercise the same validation, scheduling and caching rules the
//! production wiring uses without PostgreSQL, SMTP or network access.
//! Compiled only with the `test-support` feature.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use serde_json::{Value, json};

use crate::domain::ports::{
    CityPersistenceError, CityRepository, Geocoder, GeocodingError, Mailer, MailerError,
    PasswordHashError, PasswordHasher, RefreshQueue, RefreshQueueError, ScheduledSubscription,
    SubscriptionPersistenceError, SubscriptionRepository, UserPersistenceError, UserRepository,
    WeatherCacheError, WeatherCacheRepository, WeatherRefresh, WeatherSource, WeatherSourceError,
};
use crate::domain::{
    AccountService, City, CityId, CityName, Coordinates, ForecastDispatchService, ForecastEmail,
    Recipient, Subscription, SubscriptionId, SubscriptionService, User, UserAccount, UserId,
    Username, WeatherPorts, WeatherService, WeatherSnapshot,
};
use crate::inbound::http::state::HttpStatePorts;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *lock(&self.now) = now;
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = lock(&self.now);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }
}

#[derive(Default)]
struct Tables {
    users: Vec<UserAccount>,
    cities: Vec<City>,
    subscriptions: Vec<Subscription>,
    weather: Vec<WeatherSnapshot>,
}

/// One store implementing every repository port, so joins behave like SQL.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    /// Every stored subscription, in insertion order.
    pub fn subscriptions(&self) -> Vec<Subscription> {
        lock(&self.tables).subscriptions.clone()
    }

    pub fn cities(&self) -> Vec<City> {
        lock(&self.tables).cities.clone()
    }

    pub fn weather_for(&self, city_id: CityId) -> Option<WeatherSnapshot> {
        lock(&self.tables)
            .weather
            .iter()
            .find(|s| s.city_id == city_id)
            .cloned()
    }

    /// Overwrite a cache row directly, bypassing the service.
    pub fn put_weather(&self, snapshot: WeatherSnapshot) {
        let mut tables = lock(&self.tables);
        tables.weather.retain(|s| s.city_id != snapshot.city_id);
        tables.weather.push(snapshot);
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut tables = lock(&self.tables);
        if tables
            .users
            .iter()
            .any(|a| a.user.username == account.user.username)
        {
            return Err(UserPersistenceError::duplicate_username(
                account.user.username.as_ref(),
            ));
        }
        tables.users.push(account.clone());
        Ok(())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        Ok(lock(&self.tables)
            .users
            .iter()
            .find(|a| a.user.username == *username)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(lock(&self.tables)
            .users
            .iter()
            .find(|a| a.user.id == *id)
            .map(|a| a.user.clone()))
    }
}

#[async_trait]
impl CityRepository for InMemoryStore {
    async fn find_by_name(&self, name: &CityName) -> Result<Option<City>, CityPersistenceError> {
        Ok(lock(&self.tables)
            .cities
            .iter()
            .find(|c| c.name == *name)
            .cloned())
    }

    async fn find_by_id(&self, id: &CityId) -> Result<Option<City>, CityPersistenceError> {
        Ok(lock(&self.tables)
            .cities
            .iter()
            .find(|c| c.id == *id)
            .cloned())
    }

    async fn insert_or_get(&self, city: &City) -> Result<City, CityPersistenceError> {
        let mut tables = lock(&self.tables);
        if let Some(existing) = tables.cities.iter().find(|c| c.name == city.name) {
            return Ok(existing.clone());
        }
        tables.cities.push(city.clone());
        Ok(city.clone())
    }

    async fn list_without_weather(&self) -> Result<Vec<City>, CityPersistenceError> {
        let tables = lock(&self.tables);
        Ok(tables
            .cities
            .iter()
            .filter(|c| !tables.weather.iter().any(|s| s.city_id == c.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryStore {
    async fn insert_within_limit(
        &self,
        subscription: &Subscription,
        limit: usize,
    ) -> Result<(), SubscriptionPersistenceError> {
        let mut tables = lock(&self.tables);
        let held: Vec<&Subscription> = tables
            .subscriptions
            .iter()
            .filter(|s| s.user_id == subscription.user_id)
            .collect();
        if held.len() >= limit {
            return Err(SubscriptionPersistenceError::limit_reached(limit));
        }
        if held.iter().any(|s| s.city.id == subscription.city.id) {
            return Err(SubscriptionPersistenceError::duplicate(
                subscription.city.name.as_ref(),
            ));
        }
        tables.subscriptions.push(subscription.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, SubscriptionPersistenceError> {
        Ok(lock(&self.tables)
            .subscriptions
            .iter()
            .find(|s| s.id == *id)
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Subscription>, SubscriptionPersistenceError> {
        let mut owned: Vec<Subscription> = lock(&self.tables)
            .subscriptions
            .iter()
            .filter(|s| s.user_id == *user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.city.name.as_ref().cmp(b.city.name.as_ref()));
        Ok(owned)
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), SubscriptionPersistenceError> {
        let mut tables = lock(&self.tables);
        let slot = tables
            .subscriptions
            .iter_mut()
            .find(|s| s.id == subscription.id)
            .ok_or_else(|| {
                SubscriptionPersistenceError::query(format!(
                    "subscription {} no longer exists",
                    subscription.id
                ))
            })?;
        *slot = subscription.clone();
        Ok(())
    }

    async fn delete(&self, id: &SubscriptionId) -> Result<bool, SubscriptionPersistenceError> {
        let mut tables = lock(&self.tables);
        let before = tables.subscriptions.len();
        tables.subscriptions.retain(|s| s.id != *id);
        Ok(tables.subscriptions.len() < before)
    }

    async fn list_active(
        &self,
        due_before: Option<DateTime<Utc>>,
    ) -> Result<Vec<ScheduledSubscription>, SubscriptionPersistenceError> {
        let tables = lock(&self.tables);
        let mut scheduled: Vec<ScheduledSubscription> = tables
            .subscriptions
            .iter()
            .filter(|s| s.is_active)
            .filter(|s| due_before.is_none_or(|before| s.next_message < before))
            .filter_map(|s| {
                let owner = tables.users.iter().find(|a| a.user.id == s.user_id)?;
                Some(ScheduledSubscription {
                    subscription: s.clone(),
                    recipient: Recipient {
                        username: owner.user.username.clone(),
                        email: owner.user.email.clone(),
                    },
                })
            })
            .collect();
        scheduled.sort_by_key(|s| s.subscription.next_message);
        Ok(scheduled)
    }
}

#[async_trait]
impl WeatherCacheRepository for InMemoryStore {
    async fn find(&self, city_id: &CityId) -> Result<Option<WeatherSnapshot>, WeatherCacheError> {
        Ok(self.weather_for(*city_id))
    }

    async fn upsert(&self, snapshot: &WeatherSnapshot) -> Result<(), WeatherCacheError> {
        self.put_weather(snapshot.clone());
        Ok(())
    }

    async fn list_stale(&self, cutoff: DateTime<Utc>) -> Result<Vec<CityId>, WeatherCacheError> {
        Ok(lock(&self.tables)
            .weather
            .iter()
            .filter(|s| s.updated_at <= cutoff)
            .map(|s| s.city_id)
            .collect())
    }
}

/// Geocoder answering from a fixed table of known cities.
#[derive(Default)]
pub struct StaticGeocoder {
    known: Mutex<Vec<(String, Coordinates)>>,
    lookups: AtomicUsize,
}

impl StaticGeocoder {
    /// Register `name` (compared case-insensitively) at the given position.
    pub fn with_city(self, name: &str, latitude: f64, longitude: f64) -> Self {
        if let Ok(coordinates) = Coordinates::new(latitude, longitude) {
            lock(&self.known).push((name.to_lowercase(), coordinates));
        }
        self
    }

    /// How many lookups reached the geocoder.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn locate(&self, name: &CityName) -> Result<Option<Coordinates>, GeocodingError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let wanted = name.as_ref().to_lowercase();
        Ok(lock(&self.known)
            .iter()
            .find(|(known, _)| *known == wanted)
            .map(|(_, coordinates)| *coordinates))
    }
}

/// Weather provider returning a configurable payload.
pub struct ScriptedWeather {
    payload: Mutex<Value>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl Default for ScriptedWeather {
    fn default() -> Self {
        Self {
            payload: Mutex::new(sample_weather(12.0)),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }
}

impl ScriptedWeather {
    pub fn set_payload(&self, payload: Value) {
        *lock(&self.payload) = payload;
    }

    /// Make every following request fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// How many requests reached the provider.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherSource for ScriptedWeather {
    async fn current(&self, _coordinates: &Coordinates) -> Result<Value, WeatherSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(WeatherSourceError::transport("scripted outage"));
        }
        Ok(lock(&self.payload).clone())
    }
}

/// Provider payload shaped like an OpenWeatherMap current-weather response.
pub fn sample_weather(temp: f64) -> Value {
    json!({
        "main": { "temp": temp, "feels_like": temp - 2.0, "humidity": 70, "pressure": 1013 },
        "wind": { "speed": 3.5, "deg": 200 },
        "clouds": { "all": 40 },
        "weather": [{ "description": "scattered clouds" }]
    })
}

/// Mailer keeping every accepted message.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<ForecastEmail>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<ForecastEmail> {
        lock(&self.sent).clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &ForecastEmail) -> Result<(), MailerError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MailerError::delivery("scripted relay refusal"));
        }
        lock(&self.sent).push(email.clone());
        Ok(())
    }
}

/// Refresh queue that records city ids instead of running a worker.
#[derive(Default)]
pub struct RecordingQueue {
    queued: Mutex<Vec<CityId>>,
}

impl RecordingQueue {
    pub fn queued(&self) -> Vec<CityId> {
        lock(&self.queued).clone()
    }
}

#[async_trait]
impl RefreshQueue for RecordingQueue {
    async fn enqueue(&self, city_id: CityId) -> Result<(), RefreshQueueError> {
        lock(&self.queued).push(city_id);
        Ok(())
    }
}

/// Cheap reversible "hash" so account tests stay fast. Never use outside tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainPasswordHasher;

const PLAIN_PREFIX: &str = "plain$";

impl PasswordHasher for PlainPasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        Ok(format!("{PLAIN_PREFIX}{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        hash.strip_prefix(PLAIN_PREFIX)
            .map(|stored| stored == password)
            .ok_or_else(|| PasswordHashError::malformed_hash("missing plain$ prefix"))
    }
}

type Accounts = AccountService<InMemoryStore, PlainPasswordHasher>;
type Subscriptions = SubscriptionService<InMemoryStore, InMemoryStore, StaticGeocoder>;

/// Domain services wired over in-memory adapters.
///
/// # Examples
/// ```
/// use weather_reminder::test_support::InMemoryApp;
///
/// let app = InMemoryApp::new();
/// let _ports = app.ports();
/// assert!(app.store.subscriptions().is_empty());
/// ```
pub struct InMemoryApp {
    pub store: Arc<InMemoryStore>,
    pub geocoder: Arc<StaticGeocoder>,
    pub weather_source: Arc<ScriptedWeather>,
    pub mailer: Arc<RecordingMailer>,
    pub queue: Arc<RecordingQueue>,
    pub clock: Arc<ManualClock>,
    accounts: Arc<Accounts>,
    subscriptions: Arc<Subscriptions>,
    weather: Arc<WeatherService>,
}

impl Default for InMemoryApp {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryApp {
    /// Start at 2024-05-01 10:15 UTC with Kyiv, Lviv, London and Paris geocodable.
    pub fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 5, 1, 10, 15, 0)
            .single()
            .unwrap_or_else(Utc::now);
        let geocoder = StaticGeocoder::default()
            .with_city("Kyiv", 50.45, 30.52)
            .with_city("Lviv", 49.84, 24.03)
            .with_city("London", 51.51, -0.13)
            .with_city("Paris", 48.86, 2.35)
            .with_city("Odesa", 46.48, 30.72)
            .with_city("Kharkiv", 49.99, 36.23);
        Self::with_geocoder(geocoder, start)
    }

    pub fn with_geocoder(geocoder: StaticGeocoder, start: DateTime<Utc>) -> Self {
        let store = Arc::new(InMemoryStore::default());
        let geocoder = Arc::new(geocoder);
        let weather_source = Arc::new(ScriptedWeather::default());
        let mailer = Arc::new(RecordingMailer::default());
        let queue = Arc::new(RecordingQueue::default());
        let clock = Arc::new(ManualClock::new(start));
        let dyn_clock: Arc<dyn Clock> = clock.clone();

        let accounts = Arc::new(AccountService::new(
            Arc::clone(&store),
            Arc::new(PlainPasswordHasher),
        ));
        let subscriptions = Arc::new(SubscriptionService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&geocoder),
            Arc::clone(&dyn_clock),
        ));
        let weather = Arc::new(WeatherService::new(
            WeatherPorts {
                source: weather_source.clone(),
                cache: store.clone(),
                cities: store.clone(),
                subscriptions: store.clone(),
                queue: queue.clone(),
            },
            dyn_clock,
        ));

        Self {
            store,
            geocoder,
            weather_source,
            mailer,
            queue,
            clock,
            accounts,
            subscriptions,
            weather,
        }
    }

    /// Driving ports for [`HttpState`](crate::inbound::http::state::HttpState).
    pub fn ports(&self) -> HttpStatePorts {
        HttpStatePorts {
            login: self.accounts.clone(),
            registration: self.accounts.clone(),
            users: self.accounts.clone(),
            subscriptions: self.subscriptions.clone(),
            subscriptions_query: self.subscriptions.clone(),
            weather: self.weather.clone(),
        }
    }

    pub fn weather_refresh(&self) -> Arc<dyn WeatherRefresh> {
        self.weather.clone()
    }

    /// Dispatcher sharing this app's store, mailer, weather cache and clock.
    pub fn dispatcher(&self) -> ForecastDispatchService<InMemoryStore, RecordingMailer> {
        let clock: Arc<dyn Clock> = self.clock.clone();
        let cache: Arc<dyn WeatherCacheRepository> = self.store.clone();
        ForecastDispatchService::new(
            Arc::clone(&self.store),
            Arc::clone(&self.mailer),
            cache,
            clock,
        )
    }
}
