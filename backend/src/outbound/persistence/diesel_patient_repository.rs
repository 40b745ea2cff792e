//! PostgreSQL-backed `PatientRepository` implementation using Diesel.
//!
//! Ownership is written once at insert; no changeset in this adapter
//! carries the owner column, so reassignment is impossible at this layer
//! as well as at the service boundary.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{PatientRepository, PatientRepositoryError};
use crate::domain::{EmailAddress, Patient, PatientChanges, PatientDraft, PatientId, UserId};

use super::error_mapping::{DieselFailure, classify};
use super::models::{NewPatientRow, PatientPatchRow, PatientReplaceRow, PatientRow};
use super::pool::{DbPool, PoolError};
use super::schema::patients;

/// Diesel-backed implementation of the `PatientRepository` port.
#[derive(Clone)]
pub struct DieselPatientRepository {
    pool: DbPool,
}

impl DieselPatientRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PatientRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            PatientRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: &diesel::result::Error) -> PatientRepositoryError {
    match classify(error) {
        DieselFailure::Connection(message) => PatientRepositoryError::connection(message),
        DieselFailure::Query(message) => PatientRepositoryError::query(message),
        DieselFailure::UniqueViolation(name) => PatientRepositoryError::query(format!(
            "unexpected unique violation: {}",
            name.unwrap_or_else(|| "unknown constraint".to_owned())
        )),
    }
}

pub(crate) fn row_to_patient(row: PatientRow) -> Result<Patient, PatientRepositoryError> {
    let email = row
        .email
        .map(|raw| {
            EmailAddress::new(&raw).map_err(|err| {
                PatientRepositoryError::query(format!("stored email is invalid: {err}"))
            })
        })
        .transpose()?;
    Ok(Patient {
        id: PatientId::from_uuid(row.id),
        owner_id: UserId::from_uuid(row.owner_id),
        first_name: row.first_name,
        last_name: row.last_name,
        date_of_birth: row.date_of_birth,
        email,
        phone: row.phone,
        address: row.address,
        notes: row.notes,
        created_at: row.created_at,
    })
}

#[async_trait]
impl PatientRepository for DieselPatientRepository {
    async fn insert(
        &self,
        owner: &UserId,
        draft: &PatientDraft,
    ) -> Result<Patient, PatientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewPatientRow {
            id: Uuid::new_v4(),
            owner_id: *owner.as_uuid(),
            first_name: &draft.first_name,
            last_name: draft.last_name.as_deref(),
            date_of_birth: draft.date_of_birth,
            email: draft.email.as_ref().map(EmailAddress::as_str),
            phone: draft.phone.as_deref(),
            address: draft.address.as_deref(),
            notes: draft.notes.as_deref(),
        };

        let row: PatientRow = diesel::insert_into(patients::table)
            .values(&new_row)
            .returning(PatientRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;
        row_to_patient(row)
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<Patient>, PatientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<PatientRow> = patients::table
            .filter(patients::owner_id.eq(owner.as_uuid()))
            .order(patients::created_at.desc())
            .select(PatientRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;
        rows.into_iter().map(row_to_patient).collect()
    }

    async fn find_by_id(
        &self,
        id: PatientId,
    ) -> Result<Option<Patient>, PatientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<PatientRow> = patients::table
            .filter(patients::id.eq(id.as_uuid()))
            .select(PatientRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err))?;
        row.map(row_to_patient).transpose()
    }

    async fn update(
        &self,
        id: PatientId,
        changes: &PatientChanges,
    ) -> Result<Option<Patient>, PatientRepositoryError> {
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let patch = PatientPatchRow {
            first_name: changes.first_name.as_deref(),
            last_name: changes.last_name.as_deref(),
            date_of_birth: changes.date_of_birth,
            email: changes.email.as_ref().map(EmailAddress::as_str),
            phone: changes.phone.as_deref(),
            address: changes.address.as_deref(),
            notes: changes.notes.as_deref(),
        };

        let row: Option<PatientRow> = diesel::update(patients::table.find(id.as_uuid()))
            .set(&patch)
            .returning(PatientRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err))?;
        row.map(row_to_patient).transpose()
    }

    async fn replace(
        &self,
        id: PatientId,
        draft: &PatientDraft,
    ) -> Result<Option<Patient>, PatientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let replacement = PatientReplaceRow {
            first_name: &draft.first_name,
            last_name: draft.last_name.as_deref(),
            date_of_birth: draft.date_of_birth,
            email: draft.email.as_ref().map(EmailAddress::as_str),
            phone: draft.phone.as_deref(),
            address: draft.address.as_deref(),
            notes: draft.notes.as_deref(),
        };

        let row: Option<PatientRow> = diesel::update(patients::table.find(id.as_uuid()))
            .set(&replacement)
            .returning(PatientRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err))?;
        row.map(row_to_patient).transpose()
    }

    async fn delete(&self, id: PatientId) -> Result<bool, PatientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Mapping rows go with the patient via the FK cascade.
        let deleted = diesel::delete(patients::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;
        Ok(deleted > 0)
    }
}
