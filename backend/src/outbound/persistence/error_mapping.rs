//! Shared Diesel error classification for the repository adapters.
//!
//! Adapters translate driver failures into their port's error enum. The
//! classification lives here so unique-violation detection and the
//! connection/query split stay consistent across adapters.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// Coarse failure category shared by every port error enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection is gone; the caller maps this to its Connection
    /// variant.
    Connection(String),
    /// The statement failed; the caller maps this to its Query variant.
    Query(String),
    /// A named unique constraint was violated.
    UniqueViolation(Option<String>),
}

/// Classify a Diesel error, logging the driver detail at debug level.
pub(crate) fn classify(error: &DieselError) -> DieselFailure {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
            match kind {
                DatabaseErrorKind::UniqueViolation => {
                    DieselFailure::UniqueViolation(info.constraint_name().map(str::to_owned))
                }
                DatabaseErrorKind::ClosedConnection => {
                    DieselFailure::Connection("database connection error".to_owned())
                }
                _ => DieselFailure::Query("database error".to_owned()),
            }
        }
        DieselError::NotFound => DieselFailure::Query("record not found".to_owned()),
        other => {
            debug!(
                error_type = %std::any::type_name_of_val(other),
                "diesel operation failed"
            );
            DieselFailure::Query("database error".to_owned())
        }
    }
}

/// True when the failure is a unique violation on `constraint`.
///
/// Falls back to matching any unique violation when the driver did not
/// report a constraint name.
pub(crate) fn violates(failure: &DieselFailure, constraint: &str) -> bool {
    match failure {
        DieselFailure::UniqueViolation(Some(name)) => name == constraint,
        DieselFailure::UniqueViolation(None) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn not_found_classifies_as_query_failure() {
        let failure = classify(&DieselError::NotFound);
        assert_eq!(failure, DieselFailure::Query("record not found".to_owned()));
    }

    #[rstest]
    fn violates_matches_named_constraint() {
        let failure = DieselFailure::UniqueViolation(Some("doctors_email_key".to_owned()));
        assert!(violates(&failure, "doctors_email_key"));
        assert!(!violates(&failure, "users_email_key"));
    }

    #[rstest]
    fn violates_accepts_anonymous_unique_violations() {
        let failure = DieselFailure::UniqueViolation(None);
        assert!(violates(&failure, "doctors_email_key"));
    }

    #[rstest]
    fn non_unique_failures_never_match() {
        let failure = DieselFailure::Query("database error".to_owned());
        assert!(!violates(&failure, "doctors_email_key"));
    }
}
