//! Port abstraction for patient-doctor mapping persistence adapters and
//! their errors.

use async_trait::async_trait;

use crate::domain::{DoctorId, Mapping, MappingId, MappingWithDoctor, PatientId, UserId};

/// Persistence errors raised by mapping repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingRepositoryError {
    /// Repository connection could not be established.
    #[error("mapping repository connection failed: {message}")]
    Connection {
        /// Driver-level failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("mapping repository query failed: {message}")]
    Query {
        /// Driver-level failure description.
        message: String,
    },
    /// A mapping between this patient and doctor already exists.
    #[error("mapping already exists for this patient and doctor")]
    DuplicatePair,
}

impl MappingRepositoryError {
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

/// Insert payload for a new mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewMapping {
    /// Referenced patient.
    pub patient_id: PatientId,
    /// Referenced doctor.
    pub doctor_id: DoctorId,
    /// Principal creating the mapping.
    pub assigned_by: UserId,
}

/// A mapping resolved together with its patient's owner, as needed by the
/// deletion policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRecord {
    /// The association record.
    pub mapping: Mapping,
    /// Owner of the referenced patient.
    pub patient_owner: UserId,
}

/// Port for mapping storage.
///
/// The `(patient, doctor)` pair is unique; `insert` fails with
/// [`MappingRepositoryError::DuplicatePair`] when the pair already exists,
/// which also closes the race between concurrent duplicate creations (the
/// storage constraint decides the winner).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingRepository: Send + Sync {
    /// Insert a new mapping.
    async fn insert(&self, new_mapping: &NewMapping) -> Result<Mapping, MappingRepositoryError>;

    /// List mappings whose patient is owned by `owner`, with doctor
    /// detail, oldest first.
    async fn list_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<MappingWithDoctor>, MappingRepositoryError>;

    /// List the mappings of one patient, with doctor detail, oldest first.
    async fn list_by_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<MappingWithDoctor>, MappingRepositoryError>;

    /// Fetch a mapping together with its patient's owner.
    async fn find_by_id(
        &self,
        id: MappingId,
    ) -> Result<Option<MappingRecord>, MappingRepositoryError>;

    /// Delete a mapping; `true` when a row was removed.
    async fn delete(&self, id: MappingId) -> Result<bool, MappingRepositoryError>;
}
