//! Domain primitives, aggregates, and record services.
//!
//! Purpose: define strongly typed entities for the records API, the pure
//! authorization policy, and the services that apply it. Keep types
//! immutable and document invariants and serialisation contracts (serde) in
//! each type's Rustdoc. Nothing in this layer knows about HTTP or SQL.

pub mod auth;
pub mod doctor;
pub mod doctor_service;
pub mod email;
pub mod error;
pub mod mapping;
pub mod mapping_service;
pub mod patient;
pub mod patient_service;
pub mod policy;
pub mod ports;
pub mod registration_service;
pub mod user;

pub use self::auth::{PasswordDigest, Registration, RegistrationValidationError, TokenPair};
pub use self::doctor::{Doctor, DoctorChanges, DoctorDraft, DoctorId, DoctorValidationError};
pub use self::doctor_service::DoctorService;
pub use self::email::{EmailAddress, EmailValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::mapping::{Mapping, MappingId, MappingWithDoctor};
pub use self::mapping_service::MappingService;
pub use self::patient::{Patient, PatientChanges, PatientDraft, PatientId, PatientValidationError};
pub use self::patient_service::PatientService;
pub use self::policy::{AccessDecision, DenyReason};
pub use self::registration_service::{RegisteredAccount, RegistrationService};
pub use self::user::{UserId, UserProfile};
