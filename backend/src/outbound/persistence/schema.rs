//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation.

diesel::table! {
    /// Registered user accounts (principals).
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique login name.
        username -> Varchar,
        /// Unique contact address.
        email -> Varchar,
        /// Given (first) name.
        first_name -> Varchar,
        /// Family (last) name; empty for single-word display names.
        last_name -> Varchar,
        /// Salted password digest, `salt$hash` hex.
        password_digest -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Issued bearer tokens, stored as digests.
    auth_tokens (digest) {
        /// Primary key: SHA-256 hex digest of the opaque token.
        digest -> Varchar,
        /// Owning account.
        user_id -> Uuid,
        /// Token kind: `access` or `refresh`.
        kind -> Varchar,
        /// Expiry instant; rows past it are dead.
        expires_at -> Timestamptz,
        /// Issuance timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Shared doctor directory.
    doctors (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Given (first) name.
        first_name -> Varchar,
        /// Family (last) name.
        last_name -> Nullable<Varchar>,
        /// Globally unique contact address.
        email -> Varchar,
        /// Medical specialty.
        specialty -> Nullable<Varchar>,
        /// Contact phone number.
        phone -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Owner-scoped patient records.
    patients (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning account; cascade-deletes the patient with the owner.
        owner_id -> Uuid,
        /// Given (first) name.
        first_name -> Varchar,
        /// Family (last) name.
        last_name -> Nullable<Varchar>,
        /// Date of birth.
        date_of_birth -> Nullable<Date>,
        /// Contact address.
        email -> Nullable<Varchar>,
        /// Contact phone number.
        phone -> Nullable<Varchar>,
        /// Postal address.
        address -> Nullable<Text>,
        /// Free-form clinical notes.
        notes -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Patient-doctor associations; the pair is unique.
    patient_doctor_mappings (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Referenced patient; cascade-deleted with it.
        patient_id -> Uuid,
        /// Referenced doctor; cascade-deleted with it.
        doctor_id -> Uuid,
        /// Assigning account; set NULL when that account is removed.
        assigned_by -> Nullable<Uuid>,
        /// Assignment timestamp.
        assigned_at -> Timestamptz,
    }
}

diesel::joinable!(patients -> users (owner_id));
diesel::joinable!(patient_doctor_mappings -> patients (patient_id));
diesel::joinable!(patient_doctor_mappings -> doctors (doctor_id));
diesel::joinable!(auth_tokens -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    auth_tokens,
    doctors,
    patients,
    patient_doctor_mappings,
);
