//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{auth_tokens, doctors, patient_doctor_mappings, patients, users};

// ---------------------------------------------------------------------------
// User models
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[expect(dead_code, reason = "read back for the out-of-scope login flow")]
    pub password_digest: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password_digest: &'a str,
}

// ---------------------------------------------------------------------------
// Auth token models
// ---------------------------------------------------------------------------

/// Insertable struct for issued token digests.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = auth_tokens)]
pub(crate) struct NewAuthTokenRow<'a> {
    pub digest: &'a str,
    pub user_id: Uuid,
    pub kind: &'a str,
    pub expires_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Doctor models
// ---------------------------------------------------------------------------

/// Row struct for reading from the doctors table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = doctors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DoctorRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub specialty: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new doctor records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = doctors)]
pub(crate) struct NewDoctorRow<'a> {
    pub id: Uuid,
    pub first_name: &'a str,
    pub last_name: Option<&'a str>,
    pub email: &'a str,
    pub specialty: Option<&'a str>,
    pub phone: Option<&'a str>,
}

/// Changeset for `PATCH`: absent fields are skipped.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = doctors)]
pub(crate) struct DoctorPatchRow<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub specialty: Option<&'a str>,
    pub phone: Option<&'a str>,
}

/// Changeset for `PUT`: absent optional fields are written as NULL.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = doctors)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct DoctorReplaceRow<'a> {
    pub first_name: &'a str,
    pub last_name: Option<&'a str>,
    pub email: &'a str,
    pub specialty: Option<&'a str>,
    pub phone: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Patient models
// ---------------------------------------------------------------------------

/// Row struct for reading from the patients table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = patients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PatientRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new patient records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = patients)]
pub(crate) struct NewPatientRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub first_name: &'a str,
    pub last_name: Option<&'a str>,
    pub date_of_birth: Option<NaiveDate>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub notes: Option<&'a str>,
}

/// Changeset for `PATCH`: absent fields are skipped. The owner column is
/// deliberately absent from every changeset; ownership never moves.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = patients)]
pub(crate) struct PatientPatchRow<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub date_of_birth: Option<NaiveDate>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub notes: Option<&'a str>,
}

/// Changeset for `PUT`: absent optional fields are written as NULL.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = patients)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct PatientReplaceRow<'a> {
    pub first_name: &'a str,
    pub last_name: Option<&'a str>,
    pub date_of_birth: Option<NaiveDate>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub notes: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Mapping models
// ---------------------------------------------------------------------------

/// Row struct for reading from the patient_doctor_mappings table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = patient_doctor_mappings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MappingRow {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub assigned_by: Option<Uuid>,
    pub assigned_at: DateTime<Utc>,
}

/// Insertable struct for creating new mapping records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = patient_doctor_mappings)]
pub(crate) struct NewMappingRow {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub assigned_by: Option<Uuid>,
}
