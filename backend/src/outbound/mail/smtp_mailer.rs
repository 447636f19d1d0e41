//! Lettre-backed SMTP mailer.
//!
//! Forecasts are sent as `text/plain` UTF-8 from a single configured sender
//! address. The transport keeps a small connection pool, so a dispatch run
//! reuses one session for every recipient.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ForecastEmail;
use crate::domain::ports::{Mailer, MailerError};

/// How the relay connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmtpSecurity {
    /// Implicit TLS.
    #[default]
    Tls,
    /// Plain connection upgraded with STARTTLS.
    StartTls,
    /// No encryption. Only for local relays such as Mailpit.
    Plain,
}

impl SmtpSecurity {
    /// Conventional port for the mode.
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Tls => 465,
            Self::StartTls => 587,
            Self::Plain => 25,
        }
    }
}

/// Error returned when parsing an unknown [`SmtpSecurity`] name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown SMTP security mode '{0}'; expected tls, starttls or plain")]
pub struct UnknownSmtpSecurity(String);

impl std::str::FromStr for SmtpSecurity {
    type Err = UnknownSmtpSecurity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tls" | "ssl" => Ok(Self::Tls),
            "starttls" => Ok(Self::StartTls),
            "plain" | "none" => Ok(Self::Plain),
            other => Err(UnknownSmtpSecurity(other.to_owned())),
        }
    }
}

/// Connection parameters for [`SmtpMailer`].
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub security: SmtpSecurity,
    pub username: Option<String>,
    pub password: Option<Zeroizing<String>>,
    pub from: String,
    pub timeout: Duration,
}

/// Errors raised while building the transport.
#[derive(Debug, thiserror::Error)]
pub enum SmtpSetupError {
    #[error("sender address '{address}' is invalid: {message}")]
    Sender { address: String, message: String },
    #[error("SMTP relay '{host}' is unusable: {message}")]
    Relay { host: String, message: String },
}

/// Mailer delivering forecasts through an SMTP relay.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build a pooled transport for `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`SmtpSetupError`] when the sender address does not parse or
    /// the relay host cannot be used for TLS.
    pub fn new(settings: &SmtpSettings) -> Result<Self, SmtpSetupError> {
        let from: Mailbox = settings
            .from
            .parse()
            .map_err(|err: lettre::address::AddressError| SmtpSetupError::Sender {
                address: settings.from.clone(),
                message: err.to_string(),
            })?;

        let relay_error = |err: lettre::transport::smtp::Error| SmtpSetupError::Relay {
            host: settings.host.clone(),
            message: err.to_string(),
        };
        let builder = match settings.security {
            SmtpSecurity::Tls => {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host).map_err(relay_error)?
            }
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                    .map_err(relay_error)?
            }
            SmtpSecurity::Plain => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
            }
        };

        let mut builder = builder
            .port(settings.port)
            .timeout(Some(settings.timeout));
        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                password.as_str().to_owned(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

fn build_message(from: &Mailbox, email: &ForecastEmail) -> Result<Message, MailerError> {
    let to: Mailbox = email
        .to
        .as_ref()
        .parse()
        .map_err(|err: lettre::address::AddressError| {
            MailerError::invalid_message(format!("recipient '{}': {err}", email.to))
        })?;
    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(email.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(email.body.clone())
        .map_err(|err| MailerError::invalid_message(err.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &ForecastEmail) -> Result<(), MailerError> {
        let message = build_message(&self.from, email)?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|err| MailerError::delivery(err.to_string()))?;
        debug!(to = %email.to, code = %response.code(), "forecast email accepted");
        Ok(())
    }
}
