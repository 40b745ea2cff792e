//! Doctor registry service.
//!
//! Doctors are globally readable; mutation needs only an authenticated
//! principal. The policy check is still consulted immediately before every
//! mutation so the rule lives in one place.

use std::sync::Arc;

use serde_json::json;

use crate::domain::policy::{self, AccessDecision};
use crate::domain::ports::{DoctorRepository, DoctorRepositoryError};
use crate::domain::{Doctor, DoctorChanges, DoctorDraft, DoctorId, Error, UserId};

/// Record service for the shared doctor directory.
#[derive(Clone)]
pub struct DoctorService {
    repo: Arc<dyn DoctorRepository>,
}

impl DoctorService {
    /// Create a new service backed by the given repository.
    pub fn new(repo: Arc<dyn DoctorRepository>) -> Self {
        Self { repo }
    }

    fn map_repo_error(error: DoctorRepositoryError) -> Error {
        match error {
            DoctorRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("doctor registry unavailable: {message}"))
            }
            DoctorRepositoryError::Query { message } => {
                Error::internal(format!("doctor registry error: {message}"))
            }
            DoctorRepositoryError::DuplicateEmail => {
                Error::invalid_request("email already registered")
                    .with_details(json!({ "field": "email", "code": "duplicate_email" }))
            }
        }
    }

    fn authorize_mutation(principal: &UserId) -> Result<(), Error> {
        match policy::mutate_doctor(principal) {
            AccessDecision::Allow => Ok(()),
            AccessDecision::Deny(reason) => Err(Error::forbidden(reason.message())),
        }
    }

    /// Create a doctor record.
    pub async fn create(&self, principal: &UserId, draft: &DoctorDraft) -> Result<Doctor, Error> {
        Self::authorize_mutation(principal)?;
        self.repo.insert(draft).await.map_err(Self::map_repo_error)
    }

    /// List every doctor, newest first. Open to anonymous callers.
    pub async fn list(&self) -> Result<Vec<Doctor>, Error> {
        self.repo.list().await.map_err(Self::map_repo_error)
    }

    /// Fetch one doctor. Open to anonymous callers.
    pub async fn fetch(&self, id: DoctorId) -> Result<Doctor, Error> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(Self::map_repo_error)?
            .ok_or_else(|| Error::not_found("Doctor not found."))
    }

    /// Apply partial changes to a doctor.
    pub async fn update(
        &self,
        principal: &UserId,
        id: DoctorId,
        changes: &DoctorChanges,
    ) -> Result<Doctor, Error> {
        Self::authorize_mutation(principal)?;
        self.repo
            .update(id, changes)
            .await
            .map_err(Self::map_repo_error)?
            .ok_or_else(|| Error::not_found("Doctor not found."))
    }

    /// Replace a doctor's profile wholesale.
    pub async fn replace(
        &self,
        principal: &UserId,
        id: DoctorId,
        draft: &DoctorDraft,
    ) -> Result<Doctor, Error> {
        Self::authorize_mutation(principal)?;
        self.repo
            .replace(id, draft)
            .await
            .map_err(Self::map_repo_error)?
            .ok_or_else(|| Error::not_found("Doctor not found."))
    }

    /// Delete a doctor; its mappings go with it.
    pub async fn delete(&self, principal: &UserId, id: DoctorId) -> Result<(), Error> {
        Self::authorize_mutation(principal)?;
        let removed = self.repo.delete(id).await.map_err(Self::map_repo_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found("Doctor not found."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockDoctorRepository;
    use chrono::Utc;

    fn draft() -> DoctorDraft {
        DoctorDraft::try_from_parts("Greg", Some("House"), "greg@example.org", None, None)
            .expect("valid draft")
    }

    fn stored(draft: &DoctorDraft) -> Doctor {
        Doctor {
            id: DoctorId::random(),
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            email: draft.email.clone(),
            specialty: draft.specialty.clone(),
            phone: draft.phone.clone(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_inserts_for_any_authenticated_principal() {
        let payload = draft();
        let record = stored(&payload);
        let mut repo = MockDoctorRepository::new();
        let returned = record.clone();
        repo.expect_insert().times(1).return_once(move |_| Ok(returned));

        let service = DoctorService::new(Arc::new(repo));
        let created = service
            .create(&UserId::random(), &payload)
            .await
            .expect("create succeeds");
        assert_eq!(created, record);
    }

    #[tokio::test]
    async fn create_maps_duplicate_email_to_invalid_request() {
        let mut repo = MockDoctorRepository::new();
        repo.expect_insert()
            .times(1)
            .return_once(|_| Err(DoctorRepositoryError::DuplicateEmail));

        let service = DoctorService::new(Arc::new(repo));
        let err = service
            .create(&UserId::random(), &draft())
            .await
            .expect_err("duplicate email must fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().expect("details present");
        assert_eq!(details["code"], serde_json::json!("duplicate_email"));
    }

    #[tokio::test]
    async fn fetch_distinguishes_missing_records() {
        let mut repo = MockDoctorRepository::new();
        repo.expect_find_by_id().times(1).return_once(|_| Ok(None));

        let service = DoctorService::new(Arc::new(repo));
        let err = service
            .fetch(DoctorId::random())
            .await
            .expect_err("missing doctor must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn delete_of_unknown_id_is_not_found() {
        let mut repo = MockDoctorRepository::new();
        repo.expect_delete().times(1).return_once(|_| Ok(false));

        let service = DoctorService::new(Arc::new(repo));
        let err = service
            .delete(&UserId::random(), DoctorId::random())
            .await
            .expect_err("unknown id must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn connection_failures_surface_as_service_unavailable() {
        let mut repo = MockDoctorRepository::new();
        repo.expect_list()
            .times(1)
            .return_once(|| Err(DoctorRepositoryError::connection("refused")));

        let service = DoctorService::new(Arc::new(repo));
        let err = service.list().await.expect_err("connection failure surfaces");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
