//! In-memory port adapters for tests.
//!
//! One shared [`MemoryStore`] implements every driven port, mirroring the
//! relational semantics the Diesel adapters get from PostgreSQL: uniqueness
//! checks, cascade deletes from patients and doctors to mappings, and
//! newest-first listings. Available to integration tests through the
//! `test-support` feature; never compiled into release builds.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::ports::{
    DoctorRepository, DoctorRepositoryError, MappingRecord, MappingRepository,
    MappingRepositoryError, NewMapping, NewUser, PatientRepository, PatientRepositoryError,
    TokenService, TokenServiceError, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Doctor, DoctorChanges, DoctorDraft, DoctorId, Mapping, MappingId, MappingWithDoctor,
    Patient, PatientChanges, PatientDraft, PatientId, TokenPair, UserId, UserProfile,
};

#[derive(Default)]
struct StoreState {
    users: Vec<UserProfile>,
    doctors: Vec<Doctor>,
    patients: Vec<Patient>,
    mappings: Vec<Mapping>,
    access_tokens: HashMap<String, UserId>,
    issued: u64,
}

/// Shared in-memory backing store implementing every driven port.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().expect("memory store lock")
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, new_user: &NewUser) -> Result<UserProfile, UserRepositoryError> {
        let mut state = self.lock();
        if state.users.iter().any(|u| u.username == new_user.username) {
            return Err(UserRepositoryError::DuplicateUsername);
        }
        if state.users.iter().any(|u| u.email == new_user.email) {
            return Err(UserRepositoryError::DuplicateEmail);
        }
        let profile = UserProfile {
            id: UserId::random(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            created_at: Utc::now(),
        };
        state.users.push(profile.clone());
        Ok(profile)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, UserRepositoryError> {
        Ok(self.lock().users.iter().find(|u| u.id == *id).cloned())
    }
}

#[async_trait]
impl DoctorRepository for MemoryStore {
    async fn insert(&self, draft: &DoctorDraft) -> Result<Doctor, DoctorRepositoryError> {
        let mut state = self.lock();
        if state.doctors.iter().any(|d| d.email == draft.email) {
            return Err(DoctorRepositoryError::DuplicateEmail);
        }
        let doctor = Doctor {
            id: DoctorId::random(),
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            email: draft.email.clone(),
            specialty: draft.specialty.clone(),
            phone: draft.phone.clone(),
            created_at: Utc::now(),
        };
        state.doctors.push(doctor.clone());
        Ok(doctor)
    }

    async fn list(&self) -> Result<Vec<Doctor>, DoctorRepositoryError> {
        // Insertion order stands in for created_at; newest first.
        Ok(self.lock().doctors.iter().rev().cloned().collect())
    }

    async fn find_by_id(&self, id: DoctorId) -> Result<Option<Doctor>, DoctorRepositoryError> {
        Ok(self.lock().doctors.iter().find(|d| d.id == id).cloned())
    }

    async fn update(
        &self,
        id: DoctorId,
        changes: &DoctorChanges,
    ) -> Result<Option<Doctor>, DoctorRepositoryError> {
        let mut state = self.lock();
        if let Some(email) = &changes.email {
            if state.doctors.iter().any(|d| d.id != id && d.email == *email) {
                return Err(DoctorRepositoryError::DuplicateEmail);
            }
        }
        let Some(doctor) = state.doctors.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        if let Some(first_name) = &changes.first_name {
            doctor.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &changes.last_name {
            doctor.last_name = Some(last_name.clone());
        }
        if let Some(email) = &changes.email {
            doctor.email = email.clone();
        }
        if let Some(specialty) = &changes.specialty {
            doctor.specialty = Some(specialty.clone());
        }
        if let Some(phone) = &changes.phone {
            doctor.phone = Some(phone.clone());
        }
        Ok(Some(doctor.clone()))
    }

    async fn replace(
        &self,
        id: DoctorId,
        draft: &DoctorDraft,
    ) -> Result<Option<Doctor>, DoctorRepositoryError> {
        let mut state = self.lock();
        if state
            .doctors
            .iter()
            .any(|d| d.id != id && d.email == draft.email)
        {
            return Err(DoctorRepositoryError::DuplicateEmail);
        }
        let Some(doctor) = state.doctors.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        doctor.first_name.clone_from(&draft.first_name);
        doctor.last_name.clone_from(&draft.last_name);
        doctor.email = draft.email.clone();
        doctor.specialty.clone_from(&draft.specialty);
        doctor.phone.clone_from(&draft.phone);
        Ok(Some(doctor.clone()))
    }

    async fn delete(&self, id: DoctorId) -> Result<bool, DoctorRepositoryError> {
        let mut state = self.lock();
        let before = state.doctors.len();
        state.doctors.retain(|d| d.id != id);
        let removed = state.doctors.len() < before;
        if removed {
            // Cascade, as the FK edge would.
            state.mappings.retain(|m| m.doctor_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl PatientRepository for MemoryStore {
    async fn insert(
        &self,
        owner: &UserId,
        draft: &PatientDraft,
    ) -> Result<Patient, PatientRepositoryError> {
        let mut state = self.lock();
        let patient = Patient {
            id: PatientId::random(),
            owner_id: *owner,
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            date_of_birth: draft.date_of_birth,
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            address: draft.address.clone(),
            notes: draft.notes.clone(),
            created_at: Utc::now(),
        };
        state.patients.push(patient.clone());
        Ok(patient)
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<Patient>, PatientRepositoryError> {
        Ok(self
            .lock()
            .patients
            .iter()
            .rev()
            .filter(|p| p.owner_id == *owner)
            .cloned()
            .collect())
    }

    async fn find_by_id(
        &self,
        id: PatientId,
    ) -> Result<Option<Patient>, PatientRepositoryError> {
        Ok(self.lock().patients.iter().find(|p| p.id == id).cloned())
    }

    async fn update(
        &self,
        id: PatientId,
        changes: &PatientChanges,
    ) -> Result<Option<Patient>, PatientRepositoryError> {
        let mut state = self.lock();
        let Some(patient) = state.patients.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(first_name) = &changes.first_name {
            patient.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &changes.last_name {
            patient.last_name = Some(last_name.clone());
        }
        if let Some(date_of_birth) = changes.date_of_birth {
            patient.date_of_birth = Some(date_of_birth);
        }
        if let Some(email) = &changes.email {
            patient.email = Some(email.clone());
        }
        if let Some(phone) = &changes.phone {
            patient.phone = Some(phone.clone());
        }
        if let Some(address) = &changes.address {
            patient.address = Some(address.clone());
        }
        if let Some(notes) = &changes.notes {
            patient.notes = Some(notes.clone());
        }
        Ok(Some(patient.clone()))
    }

    async fn replace(
        &self,
        id: PatientId,
        draft: &PatientDraft,
    ) -> Result<Option<Patient>, PatientRepositoryError> {
        let mut state = self.lock();
        let Some(patient) = state.patients.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        patient.first_name.clone_from(&draft.first_name);
        patient.last_name.clone_from(&draft.last_name);
        patient.date_of_birth = draft.date_of_birth;
        patient.email.clone_from(&draft.email);
        patient.phone.clone_from(&draft.phone);
        patient.address.clone_from(&draft.address);
        patient.notes.clone_from(&draft.notes);
        Ok(Some(patient.clone()))
    }

    async fn delete(&self, id: PatientId) -> Result<bool, PatientRepositoryError> {
        let mut state = self.lock();
        let before = state.patients.len();
        state.patients.retain(|p| p.id != id);
        let removed = state.patients.len() < before;
        if removed {
            // Cascade, as the FK edge would.
            state.mappings.retain(|m| m.patient_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl MappingRepository for MemoryStore {
    async fn insert(
        &self,
        new_mapping: &NewMapping,
    ) -> Result<Mapping, MappingRepositoryError> {
        let mut state = self.lock();
        if state.mappings.iter().any(|m| {
            m.patient_id == new_mapping.patient_id && m.doctor_id == new_mapping.doctor_id
        }) {
            return Err(MappingRepositoryError::DuplicatePair);
        }
        let mapping = Mapping {
            id: MappingId::random(),
            patient_id: new_mapping.patient_id,
            doctor_id: new_mapping.doctor_id,
            assigned_by: Some(new_mapping.assigned_by),
            assigned_at: Utc::now(),
        };
        state.mappings.push(mapping.clone());
        Ok(mapping)
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<MappingWithDoctor>, MappingRepositoryError> {
        let state = self.lock();
        let owned: Vec<PatientId> = state
            .patients
            .iter()
            .filter(|p| p.owner_id == *owner)
            .map(|p| p.id)
            .collect();
        state
            .mappings
            .iter()
            .filter(|m| owned.contains(&m.patient_id))
            .map(|m| join_doctor(&state, m))
            .collect()
    }

    async fn list_by_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<MappingWithDoctor>, MappingRepositoryError> {
        let state = self.lock();
        state
            .mappings
            .iter()
            .filter(|m| m.patient_id == patient_id)
            .map(|m| join_doctor(&state, m))
            .collect()
    }

    async fn find_by_id(
        &self,
        id: MappingId,
    ) -> Result<Option<MappingRecord>, MappingRepositoryError> {
        let state = self.lock();
        let Some(mapping) = state.mappings.iter().find(|m| m.id == id) else {
            return Ok(None);
        };
        let owner = state
            .patients
            .iter()
            .find(|p| p.id == mapping.patient_id)
            .map(|p| p.owner_id)
            .ok_or_else(|| {
                MappingRepositoryError::query("mapping references a missing patient")
            })?;
        Ok(Some(MappingRecord {
            mapping: mapping.clone(),
            patient_owner: owner,
        }))
    }

    async fn delete(&self, id: MappingId) -> Result<bool, MappingRepositoryError> {
        let mut state = self.lock();
        let before = state.mappings.len();
        state.mappings.retain(|m| m.id != id);
        Ok(state.mappings.len() < before)
    }
}

fn join_doctor(
    state: &StoreState,
    mapping: &Mapping,
) -> Result<MappingWithDoctor, MappingRepositoryError> {
    let doctor = state
        .doctors
        .iter()
        .find(|d| d.id == mapping.doctor_id)
        .cloned()
        .ok_or_else(|| MappingRepositoryError::query("mapping references a missing doctor"))?;
    Ok(MappingWithDoctor {
        mapping: mapping.clone(),
        doctor,
    })
}

#[async_trait]
impl TokenService for MemoryStore {
    async fn issue_pair(&self, user: &UserId) -> Result<TokenPair, TokenServiceError> {
        let mut state = self.lock();
        state.issued += 1;
        let access = format!("access-{}-{}", state.issued, user.as_uuid().simple());
        let refresh = format!("refresh-{}-{}", state.issued, user.as_uuid().simple());
        state.access_tokens.insert(access.clone(), *user);
        Ok(TokenPair { access, refresh })
    }

    async fn resolve_access(&self, token: &str) -> Result<Option<UserId>, TokenServiceError> {
        Ok(self.lock().access_tokens.get(token).copied())
    }
}

#[cfg(test)]
mod tests {
    //! The in-memory store mirrors the relational semantics the policy and
    //! services rely on; cover the constraint and cascade behaviour.
    use super::*;

    fn doctor_draft(email: &str) -> DoctorDraft {
        DoctorDraft::try_from_parts("Greg", None, email, None, None).expect("valid draft")
    }

    fn patient_draft() -> PatientDraft {
        PatientDraft::try_from_parts("Jane", None, None, None, None, None, None)
            .expect("valid draft")
    }

    #[tokio::test]
    async fn duplicate_doctor_email_is_rejected() {
        let store = MemoryStore::new();
        DoctorRepository::insert(&store, &doctor_draft("g@example.org"))
            .await
            .expect("first insert succeeds");
        let err = DoctorRepository::insert(&store, &doctor_draft("g@example.org"))
            .await
            .expect_err("duplicate email must fail");
        assert_eq!(err, DoctorRepositoryError::DuplicateEmail);
    }

    #[tokio::test]
    async fn deleting_a_patient_cascades_to_mappings() {
        let store = MemoryStore::new();
        let owner = UserId::random();
        let doctor = DoctorRepository::insert(&store, &doctor_draft("g@example.org"))
            .await
            .expect("doctor insert");
        let patient = PatientRepository::insert(&store, &owner, &patient_draft())
            .await
            .expect("patient insert");
        MappingRepository::insert(
            &store,
            &NewMapping {
                patient_id: patient.id,
                doctor_id: doctor.id,
                assigned_by: owner,
            },
        )
        .await
        .expect("mapping insert");

        assert!(PatientRepository::delete(&store, patient.id)
            .await
            .expect("delete succeeds"));
        let remaining = MappingRepository::list_by_patient(&store, patient.id)
            .await
            .expect("list succeeds");
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn deleting_a_doctor_cascades_to_mappings() {
        let store = MemoryStore::new();
        let owner = UserId::random();
        let doctor = DoctorRepository::insert(&store, &doctor_draft("g@example.org"))
            .await
            .expect("doctor insert");
        let patient = PatientRepository::insert(&store, &owner, &patient_draft())
            .await
            .expect("patient insert");
        MappingRepository::insert(
            &store,
            &NewMapping {
                patient_id: patient.id,
                doctor_id: doctor.id,
                assigned_by: owner,
            },
        )
        .await
        .expect("mapping insert");

        assert!(DoctorRepository::delete(&store, doctor.id)
            .await
            .expect("delete succeeds"));
        let remaining = MappingRepository::list_by_patient(&store, patient.id)
            .await
            .expect("list succeeds");
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn duplicate_pair_is_rejected() {
        let store = MemoryStore::new();
        let owner = UserId::random();
        let doctor = DoctorRepository::insert(&store, &doctor_draft("g@example.org"))
            .await
            .expect("doctor insert");
        let patient = PatientRepository::insert(&store, &owner, &patient_draft())
            .await
            .expect("patient insert");
        let new_mapping = NewMapping {
            patient_id: patient.id,
            doctor_id: doctor.id,
            assigned_by: owner,
        };
        MappingRepository::insert(&store, &new_mapping)
            .await
            .expect("first insert succeeds");
        let err = MappingRepository::insert(&store, &new_mapping)
            .await
            .expect_err("duplicate pair must fail");
        assert_eq!(err, MappingRepositoryError::DuplicatePair);
    }

    #[tokio::test]
    async fn issued_access_tokens_resolve_to_their_user() {
        let store = MemoryStore::new();
        let user = UserId::random();
        let pair = TokenService::issue_pair(&store, &user)
            .await
            .expect("issue succeeds");
        let resolved = TokenService::resolve_access(&store, &pair.access)
            .await
            .expect("resolve succeeds");
        assert_eq!(resolved, Some(user));
        let unknown = TokenService::resolve_access(&store, "bogus")
            .await
            .expect("resolve succeeds");
        assert_eq!(unknown, None);
    }
}
