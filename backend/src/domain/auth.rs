//! Authentication inputs: login credentials and registration forms.
//!
//! Handlers convert raw payloads into these types before calling a port, so
//! services only ever see validated values.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{EmailAddress, UserValidationError, Username};

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN: usize = 8;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// # Examples
/// ```
/// use weather_reminder::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada ", "hunter22").unwrap();
/// assert_eq!(creds.username(), "ada");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Registration failures, each tied to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    Username(UserValidationError),
    Email(UserValidationError),
    PasswordMismatch,
    PasswordTooShort { min: usize },
    PasswordEntirelyNumeric,
}

impl RegistrationValidationError {
    /// Form field the error belongs to.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Username(_) => "username",
            Self::Email(_) => "email",
            Self::PasswordMismatch => "password2",
            Self::PasswordTooShort { .. } | Self::PasswordEntirelyNumeric => "password1",
        }
    }
}

impl fmt::Display for RegistrationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username(inner) | Self::Email(inner) => fmt::Display::fmt(inner, f),
            Self::PasswordMismatch => write!(f, "the two password fields didn't match"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must contain at least {min} characters")
            }
            Self::PasswordEntirelyNumeric => write!(f, "password can't be entirely numeric"),
        }
    }
}

impl std::error::Error for RegistrationValidationError {}

/// Validated sign-up request.
///
/// # Examples
/// ```
/// use weather_reminder::domain::{Registration, RegistrationValidationError};
///
/// let ok = Registration::try_from_parts("ada", "ada@example.com", "rainy-day", "rainy-day");
/// assert!(ok.is_ok());
///
/// let err = Registration::try_from_parts("ada", "ada@example.com", "rainy-day", "sunny-day")
///     .unwrap_err();
/// assert_eq!(err, RegistrationValidationError::PasswordMismatch);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: Username,
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate the four registration form fields.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password1: &str,
        password2: &str,
    ) -> Result<Self, RegistrationValidationError> {
        let username = Username::new(username).map_err(RegistrationValidationError::Username)?;
        let email = EmailAddress::new(email).map_err(RegistrationValidationError::Email)?;
        if password1 != password2 {
            return Err(RegistrationValidationError::PasswordMismatch);
        }
        if password1.chars().count() < PASSWORD_MIN {
            return Err(RegistrationValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if password1.chars().all(|c| c.is_ascii_digit()) {
            return Err(RegistrationValidationError::PasswordEntirelyNumeric);
        }
        Ok(Self {
            username,
            email,
            password: Zeroizing::new(password1.to_owned()),
        })
    }

    /// Requested username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Contact address for forecasts.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Plain-text password, zeroed on drop.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
