//! Pure authorization policy.
//!
//! Every rule is a function of `(principal, entity, operation)` returning
//! an [`AccessDecision`], with no storage or transport dependencies so the
//! whole policy can be unit-tested in isolation. Authentication itself is
//! the inbound adapter's job: by the time a principal reaches these
//! functions it has already been resolved from a valid credential.
//!
//! Existence is decided by the record services, which keeps "forbidden"
//! (the entity exists but is not yours) distinguishable from "not found".

use crate::domain::{Mapping, Patient, UserId};

/// Outcome of a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The principal may perform the operation.
    Allow,
    /// The principal may not perform the operation.
    Deny(DenyReason),
}

impl AccessDecision {
    /// True when the decision permits the operation.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Why a policy check denied the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The principal does not own the referenced patient.
    NotPatientOwner,
    /// The principal is neither the mapping's assigner nor the patient's
    /// owner.
    NotAssignerOrOwner,
}

impl DenyReason {
    /// Stable human-readable message surfaced to clients.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotPatientOwner => "You do not have permission to access this patient.",
            Self::NotAssignerOrOwner => "You do not have permission to delete this mapping.",
        }
    }
}

/// May `principal` read, update, or delete `patient`?
///
/// Owner-only: the same rule covers every target-specific patient
/// operation. Listing is never denied; it is scoped to the owner by the
/// service instead.
pub fn access_patient(principal: &UserId, patient: &Patient) -> AccessDecision {
    if patient.owner_id == *principal {
        AccessDecision::Allow
    } else {
        AccessDecision::Deny(DenyReason::NotPatientOwner)
    }
}

/// May `principal` create or mutate a doctor record?
///
/// Doctors are a shared directory: any authenticated principal may create,
/// update, or delete any entry. This mirrors the source system's
/// deliberate choice; intent could not be confirmed, so no per-doctor
/// ownership is added.
pub fn mutate_doctor(_principal: &UserId) -> AccessDecision {
    AccessDecision::Allow
}

/// May `principal` assign a doctor to `patient`?
///
/// Only the patient's owner may create mappings for it.
pub fn assign_doctor(principal: &UserId, patient: &Patient) -> AccessDecision {
    access_patient(principal, patient)
}

/// May `principal` view the mappings of `patient`?
pub fn view_patient_mappings(principal: &UserId, patient: &Patient) -> AccessDecision {
    access_patient(principal, patient)
}

/// May `principal` delete `mapping`, whose patient is owned by
/// `patient_owner`?
///
/// Deletion is allowed for the mapping's assigner and for the patient's
/// owner; nobody else.
pub fn delete_mapping(
    principal: &UserId,
    mapping: &Mapping,
    patient_owner: &UserId,
) -> AccessDecision {
    let is_assigner = mapping.assigned_by.as_ref() == Some(principal);
    if is_assigner || patient_owner == principal {
        AccessDecision::Allow
    } else {
        AccessDecision::Deny(DenyReason::NotAssignerOrOwner)
    }
}
