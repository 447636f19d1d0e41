//! Port for one-way password hashing.

use super::define_port_error;

define_port_error! {
    /// Failures raised while hashing or checking a password.
    pub enum PasswordHashError {
        /// The hashing primitive failed.
        Hashing { message: String } => "password hashing failed: {message}",
        /// The stored hash could not be parsed.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Hashes new passwords and verifies candidates against stored hashes.
///
/// Hashing is CPU-bound, so the port is synchronous; callers decide whether
/// to move it off the async executor.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produce a self-describing hash of `password`.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Check `password` against a hash produced by [`PasswordHasher::hash`].
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;
}
