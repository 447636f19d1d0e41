//! Shared classification of pool and Diesel failures.
//!
//! Each repository turns a [`DbFailure`] into its own port error, so the
//! unique-constraint and connection cases are recognised in one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Database failure reduced to the cases repositories distinguish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DbFailure {
    /// Connection unavailable or dropped.
    Connection(String),
    /// Unique constraint violated; carries the constraint name when known.
    UniqueViolation(Option<String>),
    /// Any other query failure.
    Query(String),
}

/// Extract the message from a pool error.
pub(crate) fn pool_failure(error: PoolError) -> DbFailure {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            DbFailure::Connection(message)
        }
    }
}

/// Classify a Diesel error and emit debug context.
pub(crate) fn diesel_failure(error: DieselError) -> DbFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DbFailure::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => DbFailure::Query("database query error".to_owned()),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DbFailure::UniqueViolation(info.constraint_name().map(str::to_owned))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DbFailure::Connection("database connection error".to_owned())
        }
        _ => DbFailure::Query("database error".to_owned()),
    }
}
