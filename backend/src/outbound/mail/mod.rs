//! SMTP outbound adapter for the `Mailer` port.

mod smtp_mailer;

pub use smtp_mailer::{SmtpMailer, SmtpSecurity, SmtpSettings, SmtpSetupError, UnknownSmtpSecurity};
