//! Patient-doctor mapping types.
//!
//! A mapping links exactly one patient to one doctor; the pair is unique.
//! Mappings are created by the patient's owner, remember who assigned them,
//! and disappear with either endpoint of the association.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Doctor, DoctorId, PatientId, UserId};

/// Identifier of a mapping record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Uuid)]
pub struct MappingId(Uuid);

impl MappingId {
    /// Wrap an existing UUID.
    pub fn from_uuid(raw: Uuid) -> Self {
        Self(raw)
    }

    /// Generate a fresh random id.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for MappingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored patient-doctor association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    /// Record identifier.
    pub id: MappingId,
    /// Referenced patient.
    pub patient_id: PatientId,
    /// Referenced doctor.
    pub doctor_id: DoctorId,
    /// Principal who created the mapping; `None` once that account is
    /// removed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_by: Option<UserId>,
    /// Server-assigned creation timestamp.
    pub assigned_at: DateTime<Utc>,
}

/// A mapping joined with the referenced doctor's profile, as returned by
/// list operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MappingWithDoctor {
    /// The association record.
    #[serde(flatten)]
    pub mapping: Mapping,
    /// The referenced doctor's full profile.
    pub doctor: Doctor,
}
