//! PostgreSQL-backed `MappingRepository` implementation using Diesel.
//!
//! The pair-uniqueness constraint is the race-closing backstop: two
//! concurrent creations of the same `(patient, doctor)` pair both reach
//! the insert, and the constraint picks the winner.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{
    MappingRecord, MappingRepository, MappingRepositoryError, NewMapping,
};
use crate::domain::{
    Doctor, DoctorId, EmailAddress, Mapping, MappingId, MappingWithDoctor, PatientId, UserId,
};

use super::error_mapping::{DieselFailure, classify, violates};
use super::models::{DoctorRow, MappingRow, NewMappingRow};
use super::pool::{DbPool, PoolError};
use super::schema::{doctors, patient_doctor_mappings, patients};

const PAIR_CONSTRAINT: &str = "patient_doctor_mappings_patient_id_doctor_id_key";

/// Diesel-backed implementation of the `MappingRepository` port.
#[derive(Clone)]
pub struct DieselMappingRepository {
    pool: DbPool,
}

impl DieselMappingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MappingRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            MappingRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: &diesel::result::Error) -> MappingRepositoryError {
    let failure = classify(error);
    if violates(&failure, PAIR_CONSTRAINT) {
        return MappingRepositoryError::DuplicatePair;
    }
    match failure {
        DieselFailure::Connection(message) => MappingRepositoryError::connection(message),
        DieselFailure::Query(message) => MappingRepositoryError::query(message),
        DieselFailure::UniqueViolation(name) => MappingRepositoryError::query(format!(
            "unexpected unique violation: {}",
            name.unwrap_or_else(|| "unknown constraint".to_owned())
        )),
    }
}

fn row_to_mapping(row: MappingRow) -> Mapping {
    Mapping {
        id: MappingId::from_uuid(row.id),
        patient_id: PatientId::from_uuid(row.patient_id),
        doctor_id: DoctorId::from_uuid(row.doctor_id),
        assigned_by: row.assigned_by.map(UserId::from_uuid),
        assigned_at: row.assigned_at,
    }
}

fn rows_to_mapping_with_doctor(
    row: MappingRow,
    doctor: DoctorRow,
) -> Result<MappingWithDoctor, MappingRepositoryError> {
    let email = EmailAddress::new(&doctor.email).map_err(|err| {
        MappingRepositoryError::query(format!("stored doctor email is invalid: {err}"))
    })?;
    Ok(MappingWithDoctor {
        mapping: row_to_mapping(row),
        doctor: Doctor {
            id: DoctorId::from_uuid(doctor.id),
            first_name: doctor.first_name,
            last_name: doctor.last_name,
            email,
            specialty: doctor.specialty,
            phone: doctor.phone,
            created_at: doctor.created_at,
        },
    })
}

#[async_trait]
impl MappingRepository for DieselMappingRepository {
    async fn insert(
        &self,
        new_mapping: &NewMapping,
    ) -> Result<Mapping, MappingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewMappingRow {
            id: Uuid::new_v4(),
            patient_id: *new_mapping.patient_id.as_uuid(),
            doctor_id: *new_mapping.doctor_id.as_uuid(),
            assigned_by: Some(*new_mapping.assigned_by.as_uuid()),
        };

        let row: MappingRow = diesel::insert_into(patient_doctor_mappings::table)
            .values(&new_row)
            .returning(MappingRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;
        Ok(row_to_mapping(row))
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<MappingWithDoctor>, MappingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(MappingRow, DoctorRow)> = patient_doctor_mappings::table
            .inner_join(patients::table)
            .inner_join(doctors::table)
            .filter(patients::owner_id.eq(owner.as_uuid()))
            .order(patient_doctor_mappings::assigned_at.asc())
            .select((MappingRow::as_select(), DoctorRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;
        rows.into_iter()
            .map(|(mapping, doctor)| rows_to_mapping_with_doctor(mapping, doctor))
            .collect()
    }

    async fn list_by_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<MappingWithDoctor>, MappingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(MappingRow, DoctorRow)> = patient_doctor_mappings::table
            .inner_join(doctors::table)
            .filter(patient_doctor_mappings::patient_id.eq(patient_id.as_uuid()))
            .order(patient_doctor_mappings::assigned_at.asc())
            .select((MappingRow::as_select(), DoctorRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;
        rows.into_iter()
            .map(|(mapping, doctor)| rows_to_mapping_with_doctor(mapping, doctor))
            .collect()
    }

    async fn find_by_id(
        &self,
        id: MappingId,
    ) -> Result<Option<MappingRecord>, MappingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<(MappingRow, Uuid)> = patient_doctor_mappings::table
            .inner_join(patients::table)
            .filter(patient_doctor_mappings::id.eq(id.as_uuid()))
            .select((MappingRow::as_select(), patients::owner_id))
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err))?;
        Ok(row.map(|(mapping, owner)| MappingRecord {
            mapping: row_to_mapping(mapping),
            patient_owner: UserId::from_uuid(owner),
        }))
    }

    async fn delete(&self, id: MappingId) -> Result<bool, MappingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(patient_doctor_mappings::table.find(id.as_uuid()))
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
    fn row_converts_to_domain_mapping() {
        let assigner = Uuid::new_v4();
        let row = MappingRow {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            assigned_by: Some(assigner),
            assigned_at: Utc::now(),
        };

        let mapping = row_to_mapping(row);
        assert_eq!(mapping.assigned_by, Some(UserId::from_uuid(assigner)));
    }

    #[rstest]
    fn removed_assigner_round_trips_as_none() {
        let row = MappingRow {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            assigned_by: None,
            assigned_at: Utc::now(),
        };

        assert_eq!(row_to_mapping(row).assigned_by, None);
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(
            repo_err,
            MappingRepositoryError::Connection { .. }
        ));
    }
}
