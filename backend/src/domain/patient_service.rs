//! Patient record service.
//!
//! Every target-specific operation follows resolve → authorize → act: the
//! record is fetched fresh, the policy is consulted against the current
//! owner, and only then does the mutation run. This keeps "forbidden"
//! (exists, not yours) distinguishable from "not found", and avoids acting
//! on a stale permission check.

use std::sync::Arc;

use crate::domain::policy::{self, AccessDecision};
use crate::domain::ports::{PatientRepository, PatientRepositoryError};
use crate::domain::{Error, Patient, PatientChanges, PatientDraft, PatientId, UserId};

/// Record service for owner-scoped patient records.
#[derive(Clone)]
pub struct PatientService {
    repo: Arc<dyn PatientRepository>,
}

impl PatientService {
    /// Create a new service backed by the given repository.
    pub fn new(repo: Arc<dyn PatientRepository>) -> Self {
        Self { repo }
    }

    fn map_repo_error(error: PatientRepositoryError) -> Error {
        match error {
            PatientRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("patient store unavailable: {message}"))
            }
            PatientRepositoryError::Query { message } => {
                Error::internal(format!("patient store error: {message}"))
            }
        }
    }

    /// Resolve a patient and check the principal's access to it.
    async fn resolve_owned(&self, principal: &UserId, id: PatientId) -> Result<Patient, Error> {
        let patient = self
            .repo
            .find_by_id(id)
            .await
            .map_err(Self::map_repo_error)?
            .ok_or_else(|| Error::not_found("Patient not found."))?;
        match policy::access_patient(principal, &patient) {
            AccessDecision::Allow => Ok(patient),
            AccessDecision::Deny(reason) => Err(Error::forbidden(reason.message())),
        }
    }

    /// Create a patient owned by the principal. Any client-supplied owner
    /// was already stripped at the request boundary; the draft cannot carry
    /// one.
    pub async fn create(
        &self,
        principal: &UserId,
        draft: &PatientDraft,
    ) -> Result<Patient, Error> {
        self.repo
            .insert(principal, draft)
            .await
            .map_err(Self::map_repo_error)
    }

    /// List the principal's patients, newest first. Never denied; scoping
    /// is the filter.
    pub async fn list(&self, principal: &UserId) -> Result<Vec<Patient>, Error> {
        self.repo
            .list_by_owner(principal)
            .await
            .map_err(Self::map_repo_error)
    }

    /// Fetch one of the principal's patients.
    pub async fn fetch(&self, principal: &UserId, id: PatientId) -> Result<Patient, Error> {
        self.resolve_owned(principal, id).await
    }

    /// Apply partial changes to one of the principal's patients.
    pub async fn update(
        &self,
        principal: &UserId,
        id: PatientId,
        changes: &PatientChanges,
    ) -> Result<Patient, Error> {
        self.resolve_owned(principal, id).await?;
        self.repo
            .update(id, changes)
            .await
            .map_err(Self::map_repo_error)?
            .ok_or_else(|| Error::not_found("Patient not found."))
    }

    /// Replace the fields of one of the principal's patients. The owner is
    /// untouched.
    pub async fn replace(
        &self,
        principal: &UserId,
        id: PatientId,
        draft: &PatientDraft,
    ) -> Result<Patient, Error> {
        self.resolve_owned(principal, id).await?;
        self.repo
            .replace(id, draft)
            .await
            .map_err(Self::map_repo_error)?
            .ok_or_else(|| Error::not_found("Patient not found."))
    }

    /// Delete one of the principal's patients; its mappings go with it.
    pub async fn delete(&self, principal: &UserId, id: PatientId) -> Result<(), Error> {
        self.resolve_owned(principal, id).await?;
        let removed = self.repo.delete(id).await.map_err(Self::map_repo_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found("Patient not found."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockPatientRepository;
    use chrono::Utc;

    fn draft() -> PatientDraft {
        PatientDraft::try_from_parts("Jane", Some("Doe"), None, None, None, None, None)
            .expect("valid draft")
    }

    fn stored(owner: UserId) -> Patient {
        Patient {
            id: PatientId::random(),
            owner_id: owner,
            first_name: "Jane".into(),
            last_name: Some("Doe".into()),
            date_of_birth: None,
            email: None,
            phone: None,
            address: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_assigns_the_principal_as_owner() {
        let principal = UserId::random();
        let record = stored(principal);
        let mut repo = MockPatientRepository::new();
        let returned = record.clone();
        repo.expect_insert()
            .withf(move |owner, _| *owner == principal)
            .times(1)
            .return_once(move |_, _| Ok(returned));

        let service = PatientService::new(Arc::new(repo));
        let created = service
            .create(&principal, &draft())
            .await
            .expect("create succeeds");
        assert_eq!(created.owner_id, principal);
    }

    #[tokio::test]
    async fn fetch_of_unknown_id_is_not_found() {
        let mut repo = MockPatientRepository::new();
        repo.expect_find_by_id().times(1).return_once(|_| Ok(None));

        let service = PatientService::new(Arc::new(repo));
        let err = service
            .fetch(&UserId::random(), PatientId::random())
            .await
            .expect_err("unknown id must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn fetch_of_foreign_patient_is_forbidden_not_missing() {
        let record = stored(UserId::random());
        let mut repo = MockPatientRepository::new();
        repo.expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(record)));

        let service = PatientService::new(Arc::new(repo));
        let err = service
            .fetch(&UserId::random(), PatientId::random())
            .await
            .expect_err("foreign patient must fail");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn update_authorizes_before_acting() {
        let record = stored(UserId::random());
        let mut repo = MockPatientRepository::new();
        repo.expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(record)));
        // The mutation must never run for a denied principal.
        repo.expect_update().times(0);

        let service = PatientService::new(Arc::new(repo));
        let changes = PatientChanges::try_from_parts(
            Some("Janet"),
            None,
            None,
            None,
            None,
            None,
            None,
        )
        .expect("valid changes");
        let err = service
            .update(&UserId::random(), PatientId::random(), &changes)
            .await
            .expect_err("foreign update must fail");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn delete_by_owner_succeeds() {
        let principal = UserId::random();
        let record = stored(principal);
        let id = record.id;
        let mut repo = MockPatientRepository::new();
        repo.expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(record)));
        repo.expect_delete().times(1).return_once(|_| Ok(true));

        let service = PatientService::new(Arc::new(repo));
        service
            .delete(&principal, id)
            .await
            .expect("owner delete succeeds");
    }

    #[tokio::test]
    async fn storage_failures_map_to_transport_agnostic_codes() {
        let mut repo = MockPatientRepository::new();
        repo.expect_list_by_owner()
            .times(1)
            .return_once(|_| Err(PatientRepositoryError::query("boom")));

        let service = PatientService::new(Arc::new(repo));
        let err = service
            .list(&UserId::random())
            .await
            .expect_err("query failure surfaces");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
