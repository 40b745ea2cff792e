//! Port abstraction for patient record persistence adapters and their
//! errors.

use async_trait::async_trait;

use crate::domain::{Patient, PatientChanges, PatientDraft, PatientId, UserId};

/// Persistence errors raised by patient repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatientRepositoryError {
    /// Repository connection could not be established.
    #[error("patient repository connection failed: {message}")]
    Connection {
        /// Driver-level failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("patient repository query failed: {message}")]
    Query {
        /// Driver-level failure description.
        message: String,
    },
}

impl PatientRepositoryError {
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

/// Port for patient record storage.
///
/// The owner is fixed at insert and never changed by `update` or
/// `replace`. Deleting a patient cascades to its mappings at the storage
/// layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Insert a new patient owned by `owner`.
    async fn insert(
        &self,
        owner: &UserId,
        draft: &PatientDraft,
    ) -> Result<Patient, PatientRepositoryError>;

    /// List the patients owned by `owner`, newest first.
    async fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<Patient>, PatientRepositoryError>;

    /// Fetch a patient by identifier, regardless of owner.
    async fn find_by_id(
        &self,
        id: PatientId,
    ) -> Result<Option<Patient>, PatientRepositoryError>;

    /// Apply partial changes to a patient.
    async fn update(
        &self,
        id: PatientId,
        changes: &PatientChanges,
    ) -> Result<Option<Patient>, PatientRepositoryError>;

    /// Replace the patient's fields with the draft, keeping the owner.
    async fn replace(
        &self,
        id: PatientId,
        draft: &PatientDraft,
    ) -> Result<Option<Patient>, PatientRepositoryError>;

    /// Delete a patient; `true` when a row was removed.
    async fn delete(&self, id: PatientId) -> Result<bool, PatientRepositoryError>;
}
