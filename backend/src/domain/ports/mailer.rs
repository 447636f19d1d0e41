//! Port for outbound email delivery.
use async_trait::async_trait;

use crate::domain::ForecastEmail;

use super::define_port_error;

define_port_error! {
    /// Failures raised by mail adapters.
    pub enum MailerError {
        /// Message could not be built from the given addresses.
        InvalidMessage { message: String } => "forecast email is invalid: {message}",
        /// Relay could not be reached or refused the message.
        Delivery { message: String } => "forecast email delivery failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &ForecastEmail) -> Result<(), MailerError>;
}
