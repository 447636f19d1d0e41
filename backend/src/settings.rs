//! Application settings loaded via OrthoConfig.
//!
//! Every field can be set from the command line, a configuration file or a
//! `WEATHER_REMINDER_*` environment variable. Raw values are kept as plain
//! strings and numbers; the accessors below validate them and apply
//! defaults, so a bad value fails startup with the offending key named.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::{DueSelection, FreshnessPolicy};
use crate::outbound::mail::{SmtpSecurity, SmtpSettings};
use crate::outbound::nominatim::NOMINATIM_DEFAULT_ENDPOINT;
use crate::outbound::openweather::OPENWEATHER_DEFAULT_ENDPOINT;
use crate::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_USER_AGENT: &str = concat!("weather-reminder/", env!("CARGO_PKG_VERSION"));

/// A setting that is missing or cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("missing required setting: {key}")]
    Missing { key: &'static str },
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

impl SettingsError {
    fn invalid(key: &'static str, message: impl ToString) -> Self {
        Self::Invalid {
            key,
            message: message.to_string(),
        }
    }
}

/// Runtime configuration for the server and its background jobs.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "WEATHER_REMINDER")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    #[ortho_config(default = 10)]
    pub db_pool_size: u32,
    /// OpenWeatherMap API key.
    pub openweather_api_key: Option<String>,
    pub openweather_endpoint: Option<String>,
    pub nominatim_endpoint: Option<String>,
    /// Nominatim requires an identifying user agent.
    pub geocoder_user_agent: Option<String>,
    /// Timeout applied to every outbound HTTP request.
    #[ortho_config(default = 10)]
    pub http_timeout_secs: u64,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    /// `tls` (default), `starttls` or `plain`.
    pub smtp_security: Option<String>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// Sender address; defaults to the SMTP username.
    pub mail_from: Option<String>,
    #[ortho_config(default = 300)]
    pub refresh_interval_secs: u64,
    #[ortho_config(default = 60)]
    pub dispatch_interval_secs: u64,
    /// Cache rows at least this old are queued for refresh.
    #[ortho_config(default = 55)]
    pub refresh_after_mins: i64,
    /// `current_hour` (default) or `hour_of_day`.
    pub due_selection: Option<String>,
}

fn required<'a>(value: Option<&'a String>, key: &'static str) -> Result<&'a str, SettingsError> {
    value
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty())
        .ok_or(SettingsError::Missing { key })
}

fn endpoint(value: Option<&String>, default: &str, key: &'static str) -> Result<Url, SettingsError> {
    let raw = value.map_or(default, String::as_str);
    Url::parse(raw).map_err(|err| SettingsError::invalid(key, err))
}

fn interval(secs: u64, key: &'static str) -> Result<Duration, SettingsError> {
    if secs == 0 {
        return Err(SettingsError::invalid(key, "must be at least one second"));
    }
    Ok(Duration::from_secs(secs))
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|err| SettingsError::invalid("bind_addr", err))
    }

    pub fn database_url(&self) -> Result<&str, SettingsError> {
        required(self.database_url.as_ref(), "database_url")
    }

    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        if self.db_pool_size == 0 {
            return Err(SettingsError::invalid("db_pool_size", "must be positive"));
        }
        Ok(PoolConfig::new(self.database_url()?).with_max_size(self.db_pool_size))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }

    pub fn openweather_api_key(&self) -> Result<&str, SettingsError> {
        required(self.openweather_api_key.as_ref(), "openweather_api_key")
    }

    pub fn openweather_endpoint(&self) -> Result<Url, SettingsError> {
        endpoint(
            self.openweather_endpoint.as_ref(),
            OPENWEATHER_DEFAULT_ENDPOINT,
            "openweather_endpoint",
        )
    }

    pub fn nominatim_endpoint(&self) -> Result<Url, SettingsError> {
        endpoint(
            self.nominatim_endpoint.as_ref(),
            NOMINATIM_DEFAULT_ENDPOINT,
            "nominatim_endpoint",
        )
    }

    pub fn geocoder_user_agent(&self) -> &str {
        self.geocoder_user_agent
            .as_deref()
            .unwrap_or(DEFAULT_USER_AGENT)
    }

    /// SMTP relay parameters; the port follows the security mode unless set.
    pub fn smtp_settings(&self) -> Result<SmtpSettings, SettingsError> {
        let host = required(self.smtp_host.as_ref(), "smtp_host")?.to_owned();
        let security = match self.smtp_security.as_deref() {
            Some(raw) => raw
                .parse::<SmtpSecurity>()
                .map_err(|err| SettingsError::invalid("smtp_security", err))?,
            None => SmtpSecurity::default(),
        };
        let from = self
            .mail_from
            .as_ref()
            .or(self.smtp_username.as_ref())
            .cloned()
            .ok_or(SettingsError::Missing { key: "mail_from" })?;

        Ok(SmtpSettings {
            host,
            port: self.smtp_port.unwrap_or_else(|| security.default_port()),
            security,
            username: self.smtp_username.clone(),
            password: self.smtp_password.clone().map(Zeroizing::new),
            from,
            timeout: self.http_timeout(),
        })
    }

    pub fn refresh_interval(&self) -> Result<Duration, SettingsError> {
        interval(self.refresh_interval_secs, "refresh_interval_secs")
    }

    pub fn dispatch_interval(&self) -> Result<Duration, SettingsError> {
        interval(self.dispatch_interval_secs, "dispatch_interval_secs")
    }

    /// One hour read TTL with the configured background refresh threshold.
    pub fn freshness_policy(&self) -> Result<FreshnessPolicy, SettingsError> {
        if !(1..=60).contains(&self.refresh_after_mins) {
            return Err(SettingsError::invalid(
                "refresh_after_mins",
                "must be between 1 and 60",
            ));
        }
        Ok(FreshnessPolicy::new(
            TimeDelta::hours(1),
            TimeDelta::minutes(self.refresh_after_mins),
        ))
    }

    pub fn due_selection(&self) -> Result<DueSelection, SettingsError> {
        self.due_selection
            .as_deref()
            .map_or(Ok(DueSelection::default()), str::parse)
            .map_err(|err| SettingsError::invalid("due_selection", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const KEYS: [&str; 13] = [
        "WEATHER_REMINDER_BIND_ADDR",
        "WEATHER_REMINDER_DATABASE_URL",
        "WEATHER_REMINDER_DB_POOL_SIZE",
        "WEATHER_REMINDER_OPENWEATHER_API_KEY",
        "WEATHER_REMINDER_OPENWEATHER_ENDPOINT",
        "WEATHER_REMINDER_SMTP_HOST",
        "WEATHER_REMINDER_SMTP_PORT",
        "WEATHER_REMINDER_SMTP_SECURITY",
        "WEATHER_REMINDER_SMTP_USERNAME",
        "WEATHER_REMINDER_MAIL_FROM",
        "WEATHER_REMINDER_REFRESH_INTERVAL_SECS",
        "WEATHER_REMINDER_REFRESH_AFTER_MINS",
        "WEATHER_REMINDER_DUE_SELECTION",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> AppSettings {
        let vars = KEYS.map(|key| {
            let value = overrides
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value).to_owned());
            (key, value)
        });
        let _guard = lock_env(vars);
        AppSettings::load_from_iter([OsString::from("weather-reminder")])
            .expect("settings should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let settings = load_with(&[]);

        assert_eq!(
            settings.bind_addr().expect("default bind"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(settings.db_pool_size, 10);
        assert_eq!(settings.refresh_interval().expect("interval"), Duration::from_secs(300));
        assert_eq!(settings.dispatch_interval().expect("interval"), Duration::from_secs(60));
        assert_eq!(settings.due_selection().expect("selection"), DueSelection::CurrentHour);
        assert_eq!(
            settings.openweather_endpoint().expect("endpoint").as_str(),
            OPENWEATHER_DEFAULT_ENDPOINT
        );
        assert_eq!(settings.freshness_policy().expect("policy"), FreshnessPolicy::default());
        assert!(settings.geocoder_user_agent().starts_with("weather-reminder/"));
    }

    #[rstest]
    fn required_values_are_reported_by_name() {
        let settings = load_with(&[]);

        assert_eq!(
            settings.database_url(),
            Err(SettingsError::Missing { key: "database_url" })
        );
        assert_eq!(
            settings.openweather_api_key(),
            Err(SettingsError::Missing {
                key: "openweather_api_key"
            })
        );
        assert!(matches!(
            settings.smtp_settings(),
            Err(SettingsError::Missing { key: "smtp_host" })
        ));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("WEATHER_REMINDER_DATABASE_URL", "postgres://db/weather"),
            ("WEATHER_REMINDER_DB_POOL_SIZE", "4"),
            ("WEATHER_REMINDER_OPENWEATHER_API_KEY", "secret"),
            ("WEATHER_REMINDER_DUE_SELECTION", "hour_of_day"),
            ("WEATHER_REMINDER_REFRESH_AFTER_MINS", "30"),
        ]);

        assert_eq!(settings.database_url(), Ok("postgres://db/weather"));
        assert_eq!(settings.db_pool_size, 4);
        assert_eq!(settings.openweather_api_key(), Ok("secret"));
        assert_eq!(settings.due_selection(), Ok(DueSelection::HourOfDay));
        assert_eq!(
            settings.freshness_policy().expect("policy"),
            FreshnessPolicy::new(TimeDelta::hours(1), TimeDelta::minutes(30))
        );
    }

    #[rstest]
    fn smtp_defaults_to_implicit_tls_and_username_as_sender() {
        let settings = load_with(&[
            ("WEATHER_REMINDER_SMTP_HOST", "smtp.example.com"),
            ("WEATHER_REMINDER_SMTP_USERNAME", "reminder@example.com"),
        ]);
        let smtp = settings.smtp_settings().expect("smtp settings");

        assert_eq!(smtp.security, SmtpSecurity::Tls);
        assert_eq!(smtp.port, 465);
        assert_eq!(smtp.from, "reminder@example.com");
    }

    #[rstest]
    fn explicit_smtp_port_and_mode_win() {
        let settings = load_with(&[
            ("WEATHER_REMINDER_SMTP_HOST", "localhost"),
            ("WEATHER_REMINDER_SMTP_SECURITY", "plain"),
            ("WEATHER_REMINDER_SMTP_PORT", "1025"),
            ("WEATHER_REMINDER_MAIL_FROM", "noreply@example.com"),
        ]);
        let smtp = settings.smtp_settings().expect("smtp settings");

        assert_eq!(smtp.security, SmtpSecurity::Plain);
        assert_eq!(smtp.port, 1025);
        assert!(smtp.username.is_none());
    }

    #[rstest]
    #[case("WEATHER_REMINDER_BIND_ADDR", "not-an-address", "bind_addr")]
    #[case("WEATHER_REMINDER_OPENWEATHER_ENDPOINT", "::nope", "openweather_endpoint")]
    #[case("WEATHER_REMINDER_REFRESH_INTERVAL_SECS", "0", "refresh_interval_secs")]
    #[case("WEATHER_REMINDER_REFRESH_AFTER_MINS", "90", "refresh_after_mins")]
    #[case("WEATHER_REMINDER_DUE_SELECTION", "sometimes", "due_selection")]
    fn invalid_values_name_their_key(
        #[case] var: &str,
        #[case] value: &str,
        #[case] key: &'static str,
    ) {
        let settings = load_with(&[(var, value)]);
        let err = match key {
            "bind_addr" => settings.bind_addr().map(|_| ()),
            "openweather_endpoint" => settings.openweather_endpoint().map(|_| ()),
            "refresh_interval_secs" => settings.refresh_interval().map(|_| ()),
            "refresh_after_mins" => settings.freshness_policy().map(|_| ()),
            _ => settings.due_selection().map(|_| ()),
        }
        .expect_err("invalid value rejected");
        assert!(matches!(err, SettingsError::Invalid { key: k, .. } if k == key));
    }
}
