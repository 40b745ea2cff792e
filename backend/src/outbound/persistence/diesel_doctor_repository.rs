//! PostgreSQL-backed `DoctorRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{DoctorRepository, DoctorRepositoryError};
use crate::domain::{Doctor, DoctorChanges, DoctorDraft, DoctorId, EmailAddress};

use super::error_mapping::{DieselFailure, classify, violates};
use super::models::{DoctorPatchRow, DoctorReplaceRow, DoctorRow, NewDoctorRow};
use super::pool::{DbPool, PoolError};
use super::schema::doctors;

const EMAIL_CONSTRAINT: &str = "doctors_email_key";

/// Diesel-backed implementation of the `DoctorRepository` port.
#[derive(Clone)]
pub struct DieselDoctorRepository {
    pool: DbPool,
}

impl DieselDoctorRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DoctorRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            DoctorRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: &diesel::result::Error) -> DoctorRepositoryError {
    let failure = classify(error);
    if violates(&failure, EMAIL_CONSTRAINT) {
        return DoctorRepositoryError::DuplicateEmail;
    }
    match failure {
        DieselFailure::Connection(message) => DoctorRepositoryError::connection(message),
        DieselFailure::Query(message) => DoctorRepositoryError::query(message),
        DieselFailure::UniqueViolation(name) => DoctorRepositoryError::query(format!(
            "unexpected unique violation: {}",
            name.unwrap_or_else(|| "unknown constraint".to_owned())
        )),
    }
}

fn row_to_doctor(row: DoctorRow) -> Result<Doctor, DoctorRepositoryError> {
    let email = EmailAddress::new(&row.email)
        .map_err(|err| DoctorRepositoryError::query(format!("stored email is invalid: {err}")))?;
    Ok(Doctor {
        id: DoctorId::from_uuid(row.id),
        first_name: row.first_name,
        last_name: row.last_name,
        email,
        specialty: row.specialty,
        phone: row.phone,
        created_at: row.created_at,
    })
}

#[async_trait]
impl DoctorRepository for DieselDoctorRepository {
    async fn insert(&self, draft: &DoctorDraft) -> Result<Doctor, DoctorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewDoctorRow {
            id: Uuid::new_v4(),
            first_name: &draft.first_name,
            last_name: draft.last_name.as_deref(),
            email: draft.email.as_str(),
            specialty: draft.specialty.as_deref(),
            phone: draft.phone.as_deref(),
        };

        let row: DoctorRow = diesel::insert_into(doctors::table)
            .values(&new_row)
            .returning(DoctorRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;
        row_to_doctor(row)
    }

    async fn list(&self) -> Result<Vec<Doctor>, DoctorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<DoctorRow> = doctors::table
            .order(doctors::created_at.desc())
            .select(DoctorRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;
        rows.into_iter().map(row_to_doctor).collect()
    }

    async fn find_by_id(&self, id: DoctorId) -> Result<Option<Doctor>, DoctorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<DoctorRow> = doctors::table
            .filter(doctors::id.eq(id.as_uuid()))
            .select(DoctorRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err))?;
        row.map(row_to_doctor).transpose()
    }

    async fn update(
        &self,
        id: DoctorId,
        changes: &DoctorChanges,
    ) -> Result<Option<Doctor>, DoctorRepositoryError> {
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let patch = DoctorPatchRow {
            first_name: changes.first_name.as_deref(),
            last_name: changes.last_name.as_deref(),
            email: changes.email.as_ref().map(EmailAddress::as_str),
            specialty: changes.specialty.as_deref(),
            phone: changes.phone.as_deref(),
        };

        let row: Option<DoctorRow> = diesel::update(doctors::table.find(id.as_uuid()))
            .set(&patch)
            .returning(DoctorRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err))?;
        row.map(row_to_doctor).transpose()
    }

    async fn replace(
        &self,
        id: DoctorId,
        draft: &DoctorDraft,
    ) -> Result<Option<Doctor>, DoctorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let replacement = DoctorReplaceRow {
            first_name: &draft.first_name,
            last_name: draft.last_name.as_deref(),
            email: draft.email.as_str(),
            specialty: draft.specialty.as_deref(),
            phone: draft.phone.as_deref(),
        };

        let row: Option<DoctorRow> = diesel::update(doctors::table.find(id.as_uuid()))
            .set(&replacement)
            .returning(DoctorRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err))?;
        row.map(row_to_doctor).transpose()
    }

    async fn delete(&self, id: DoctorId) -> Result<bool, DoctorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(doctors::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the pure mapping helpers.
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(
            repo_err,
            DoctorRepositoryError::Connection { .. }
        ));
        assert!(repo_err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let repo_err = map_diesel_error(&diesel::result::Error::NotFound);

        assert!(matches!(repo_err, DoctorRepositoryError::Query { .. }));
    }

    #[rstest]
    fn row_converts_to_domain_doctor() {
        let row = DoctorRow {
            id: Uuid::new_v4(),
            first_name: "Greg".into(),
            last_name: Some("House".into()),
            email: "greg@example.org".into(),
            specialty: None,
            phone: None,
            created_at: Utc::now(),
        };

        let doctor = row_to_doctor(row).expect("valid row");
        assert_eq!(doctor.first_name, "Greg");
        assert_eq!(doctor.email.as_str(), "greg@example.org");
    }

    #[rstest]
    fn corrupt_stored_email_surfaces_as_query_error() {
        let row = DoctorRow {
            id: Uuid::new_v4(),
            first_name: "Greg".into(),
            last_name: None,
            email: "not-an-email".into(),
            specialty: None,
            phone: None,
            created_at: Utc::now(),
        };

        let err = row_to_doctor(row).expect_err("corrupt email must fail");
        assert!(matches!(err, DoctorRepositoryError::Query { .. }));
    }
}
