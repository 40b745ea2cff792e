//! Patient-doctor mapping service.
//!
//! Creation resolves both endpoints before the policy check so an unknown
//! id is reported as "not found" rather than leaking through a permission
//! error. The pair-uniqueness constraint is enforced by the storage layer;
//! this service only translates the violation.

use std::sync::Arc;

use serde_json::json;

use crate::domain::policy::{self, AccessDecision};
use crate::domain::ports::{
    DoctorRepository, DoctorRepositoryError, MappingRepository, MappingRepositoryError,
    NewMapping, PatientRepository, PatientRepositoryError,
};
use crate::domain::{
    DoctorId, Error, Mapping, MappingId, MappingWithDoctor, Patient, PatientId, UserId,
};

/// Record service for patient-doctor associations.
#[derive(Clone)]
pub struct MappingService {
    mappings: Arc<dyn MappingRepository>,
    patients: Arc<dyn PatientRepository>,
    doctors: Arc<dyn DoctorRepository>,
}

impl MappingService {
    /// Create a new service over the three repositories it consults.
    pub fn new(
        mappings: Arc<dyn MappingRepository>,
        patients: Arc<dyn PatientRepository>,
        doctors: Arc<dyn DoctorRepository>,
    ) -> Self {
        Self {
            mappings,
            patients,
            doctors,
        }
    }

    fn map_mapping_error(error: MappingRepositoryError) -> Error {
        match error {
            MappingRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("mapping store unavailable: {message}"))
            }
            MappingRepositoryError::Query { message } => {
                Error::internal(format!("mapping store error: {message}"))
            }
            MappingRepositoryError::DuplicatePair => {
                Error::invalid_request("mapping already exists for this patient and doctor")
                    .with_details(json!({ "code": "duplicate_mapping" }))
            }
        }
    }

    fn map_patient_error(error: PatientRepositoryError) -> Error {
        match error {
            PatientRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("patient store unavailable: {message}"))
            }
            PatientRepositoryError::Query { message } => {
                Error::internal(format!("patient store error: {message}"))
            }
        }
    }

    fn map_doctor_error(error: DoctorRepositoryError) -> Error {
        match error {
            DoctorRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("doctor registry unavailable: {message}"))
            }
            DoctorRepositoryError::Query { message } => {
                Error::internal(format!("doctor registry error: {message}"))
            }
            // Mapping flows never insert doctors; a uniqueness violation
            // here means the adapter misbehaved.
            DoctorRepositoryError::DuplicateEmail => {
                Error::internal("unexpected doctor uniqueness violation")
            }
        }
    }

    async fn resolve_patient(&self, id: PatientId) -> Result<Patient, Error> {
        self.patients
            .find_by_id(id)
            .await
            .map_err(Self::map_patient_error)?
            .ok_or_else(|| Error::not_found("Patient not found."))
    }

    /// Assign `doctor_id` to `patient_id` on behalf of the principal.
    pub async fn create(
        &self,
        principal: &UserId,
        patient_id: PatientId,
        doctor_id: DoctorId,
    ) -> Result<Mapping, Error> {
        let patient = self.resolve_patient(patient_id).await?;
        self.doctors
            .find_by_id(doctor_id)
            .await
            .map_err(Self::map_doctor_error)?
            .ok_or_else(|| Error::not_found("Doctor not found."))?;

        if let AccessDecision::Deny(_) = policy::assign_doctor(principal, &patient) {
            return Err(Error::forbidden(
                "You can only assign doctors to patients you created.",
            ));
        }

        let new_mapping = NewMapping {
            patient_id,
            doctor_id,
            assigned_by: *principal,
        };
        self.mappings
            .insert(&new_mapping)
            .await
            .map_err(Self::map_mapping_error)
    }

    /// List the principal's mappings (those whose patient it owns), with
    /// doctor detail.
    pub async fn list(&self, principal: &UserId) -> Result<Vec<MappingWithDoctor>, Error> {
        self.mappings
            .list_for_owner(principal)
            .await
            .map_err(Self::map_mapping_error)
    }

    /// List the mappings of one patient the principal owns.
    pub async fn list_by_patient(
        &self,
        principal: &UserId,
        patient_id: PatientId,
    ) -> Result<Vec<MappingWithDoctor>, Error> {
        let patient = self.resolve_patient(patient_id).await?;
        match policy::view_patient_mappings(principal, &patient) {
            AccessDecision::Allow => self
                .mappings
                .list_by_patient(patient_id)
                .await
                .map_err(Self::map_mapping_error),
            AccessDecision::Deny(_) => Err(Error::forbidden(
                "You do not have permission to view mappings for this patient.",
            )),
        }
    }

    /// Delete a mapping as its assigner or the patient's owner.
    pub async fn delete(&self, principal: &UserId, id: MappingId) -> Result<(), Error> {
        let record = self
            .mappings
            .find_by_id(id)
            .await
            .map_err(Self::map_mapping_error)?
            .ok_or_else(|| Error::not_found("Mapping not found."))?;

        match policy::delete_mapping(principal, &record.mapping, &record.patient_owner) {
            AccessDecision::Allow => {}
            AccessDecision::Deny(reason) => return Err(Error::forbidden(reason.message())),
        }

        let removed = self
            .mappings
            .delete(id)
            .await
            .map_err(Self::map_mapping_error)?;
        if removed {
            Ok(())
        } else {
            // Deleted concurrently between resolve and act.
            Err(Error::not_found("Mapping not found."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{
        MappingRecord, MockDoctorRepository, MockMappingRepository, MockPatientRepository,
    };
    use crate::domain::{Doctor, EmailAddress};
    use chrono::Utc;

    fn patient_owned_by(owner: UserId) -> Patient {
        Patient {
            id: PatientId::random(),
            owner_id: owner,
            first_name: "Jane".into(),
            last_name: None,
            date_of_birth: None,
            email: None,
            phone: None,
            address: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn doctor() -> Doctor {
        Doctor {
            id: DoctorId::random(),
            first_name: "Greg".into(),
            last_name: Some("House".into()),
            email: EmailAddress::new("greg@example.org").expect("valid email"),
            specialty: Some("diagnostics".into()),
            phone: None,
            created_at: Utc::now(),
        }
    }

    fn mapping(patient_id: PatientId, doctor_id: DoctorId, assigner: UserId) -> Mapping {
        Mapping {
            id: MappingId::random(),
            patient_id,
            doctor_id,
            assigned_by: Some(assigner),
            assigned_at: Utc::now(),
        }
    }

    fn service(
        mappings: MockMappingRepository,
        patients: MockPatientRepository,
        doctors: MockDoctorRepository,
    ) -> MappingService {
        MappingService::new(Arc::new(mappings), Arc::new(patients), Arc::new(doctors))
    }

    #[tokio::test]
    async fn create_records_the_principal_as_assigner() {
        let principal = UserId::random();
        let patient = patient_owned_by(principal);
        let patient_id = patient.id;
        let doc = doctor();
        let doctor_id = doc.id;
        let created = mapping(patient_id, doctor_id, principal);

        let mut patients = MockPatientRepository::new();
        patients
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(patient)));
        let mut doctors = MockDoctorRepository::new();
        doctors
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(doc)));
        let mut mappings = MockMappingRepository::new();
        let returned = created.clone();
        mappings
            .expect_insert()
            .withf(move |new_mapping| new_mapping.assigned_by == principal)
            .times(1)
            .return_once(move |_| Ok(returned));

        let result = service(mappings, patients, doctors)
            .create(&principal, patient_id, doctor_id)
            .await
            .expect("create succeeds");
        assert_eq!(result.assigned_by, Some(principal));
    }

    #[tokio::test]
    async fn create_for_unknown_patient_is_not_found() {
        let mut patients = MockPatientRepository::new();
        patients.expect_find_by_id().times(1).return_once(|_| Ok(None));
        let mut doctors = MockDoctorRepository::new();
        doctors.expect_find_by_id().times(0);
        let mut mappings = MockMappingRepository::new();
        mappings.expect_insert().times(0);

        let err = service(mappings, patients, doctors)
            .create(&UserId::random(), PatientId::random(), DoctorId::random())
            .await
            .expect_err("unknown patient must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn create_for_foreign_patient_is_forbidden() {
        let patient = patient_owned_by(UserId::random());
        let doc = doctor();
        let mut patients = MockPatientRepository::new();
        patients
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(patient)));
        let mut doctors = MockDoctorRepository::new();
        doctors
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(doc)));
        let mut mappings = MockMappingRepository::new();
        mappings.expect_insert().times(0);

        let err = service(mappings, patients, doctors)
            .create(&UserId::random(), PatientId::random(), DoctorId::random())
            .await
            .expect_err("foreign patient must fail");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(
            err.message(),
            "You can only assign doctors to patients you created."
        );
    }

    #[tokio::test]
    async fn create_maps_duplicate_pair_to_invalid_request() {
        let principal = UserId::random();
        let patient = patient_owned_by(principal);
        let doc = doctor();
        let mut patients = MockPatientRepository::new();
        patients
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(patient)));
        let mut doctors = MockDoctorRepository::new();
        doctors
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(doc)));
        let mut mappings = MockMappingRepository::new();
        mappings
            .expect_insert()
            .times(1)
            .return_once(|_| Err(MappingRepositoryError::DuplicatePair));

        let err = service(mappings, patients, doctors)
            .create(&principal, PatientId::random(), DoctorId::random())
            .await
            .expect_err("duplicate pair must fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().expect("details present");
        assert_eq!(details["code"], serde_json::json!("duplicate_mapping"));
    }

    #[tokio::test]
    async fn delete_requires_assigner_or_owner() {
        let record = MappingRecord {
            mapping: mapping(PatientId::random(), DoctorId::random(), UserId::random()),
            patient_owner: UserId::random(),
        };
        let mut mappings = MockMappingRepository::new();
        mappings
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(record)));
        mappings.expect_delete().times(0);

        let err = service(
            mappings,
            MockPatientRepository::new(),
            MockDoctorRepository::new(),
        )
        .delete(&UserId::random(), MappingId::random())
        .await
        .expect_err("stranger delete must fail");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn delete_by_assigner_succeeds() {
        let assigner = UserId::random();
        let record = MappingRecord {
            mapping: mapping(PatientId::random(), DoctorId::random(), assigner),
            patient_owner: UserId::random(),
        };
        let mut mappings = MockMappingRepository::new();
        mappings
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(record)));
        mappings.expect_delete().times(1).return_once(|_| Ok(true));

        service(
            mappings,
            MockPatientRepository::new(),
            MockDoctorRepository::new(),
        )
        .delete(&assigner, MappingId::random())
        .await
        .expect("assigner delete succeeds");
    }

    #[tokio::test]
    async fn delete_of_unknown_mapping_is_not_found() {
        let mut mappings = MockMappingRepository::new();
        mappings.expect_find_by_id().times(1).return_once(|_| Ok(None));

        let err = service(
            mappings,
            MockPatientRepository::new(),
            MockDoctorRepository::new(),
        )
        .delete(&UserId::random(), MappingId::random())
        .await
        .expect_err("unknown mapping must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn list_by_patient_checks_ownership() {
        let patient = patient_owned_by(UserId::random());
        let patient_id = patient.id;
        let mut patients = MockPatientRepository::new();
        patients
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(patient)));
        let mut mappings = MockMappingRepository::new();
        mappings.expect_list_by_patient().times(0);

        let err = service(mappings, patients, MockDoctorRepository::new())
            .list_by_patient(&UserId::random(), patient_id)
            .await
            .expect_err("foreign patient must fail");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}
