//! Port abstraction for doctor registry persistence adapters and their
//! errors.

use async_trait::async_trait;

use crate::domain::{Doctor, DoctorChanges, DoctorDraft, DoctorId};

/// Persistence errors raised by doctor repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DoctorRepositoryError {
    /// Repository connection could not be established.
    #[error("doctor repository connection failed: {message}")]
    Connection {
        /// Driver-level failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("doctor repository query failed: {message}")]
    Query {
        /// Driver-level failure description.
        message: String,
    },
    /// Another doctor already uses this email.
    #[error("doctor email already registered")]
    DuplicateEmail,
}

impl DoctorRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for doctor registry storage.
///
/// `update` applies partial changes; `replace` rewrites the whole profile,
/// clearing optional fields the draft leaves out. Both return `None` when
/// the id does not resolve. Deleting a doctor cascades to its mappings at
/// the storage layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DoctorRepository: Send + Sync {
    /// Insert a new doctor, enforcing email uniqueness.
    async fn insert(&self, draft: &DoctorDraft) -> Result<Doctor, DoctorRepositoryError>;

    /// List all doctors, newest first.
    async fn list(&self) -> Result<Vec<Doctor>, DoctorRepositoryError>;

    /// Fetch a doctor by identifier.
    async fn find_by_id(&self, id: DoctorId) -> Result<Option<Doctor>, DoctorRepositoryError>;

    /// Apply partial changes to a doctor.
    async fn update(
        &self,
        id: DoctorId,
        changes: &DoctorChanges,
    ) -> Result<Option<Doctor>, DoctorRepositoryError>;

    /// Replace the whole profile with the draft.
    async fn replace(
        &self,
        id: DoctorId,
        draft: &DoctorDraft,
    ) -> Result<Option<Doctor>, DoctorRepositoryError>;

    /// Delete a doctor; `true` when a row was removed.
    async fn delete(&self, id: DoctorId) -> Result<bool, DoctorRepositoryError>;
}
