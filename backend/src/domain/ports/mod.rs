//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (repositories, token issuance) are async traits the
//! outbound adapters implement. Each carries its own error enum so
//! services can map storage failures to domain errors without importing
//! adapter types.

mod doctor_repository;
mod mapping_repository;
mod patient_repository;
mod token_service;
mod user_repository;

#[cfg(test)]
pub use doctor_repository::MockDoctorRepository;
pub use doctor_repository::{DoctorRepository, DoctorRepositoryError};
#[cfg(test)]
pub use mapping_repository::MockMappingRepository;
pub use mapping_repository::{
    MappingRecord, MappingRepository, MappingRepositoryError, NewMapping,
};
#[cfg(test)]
pub use patient_repository::MockPatientRepository;
pub use patient_repository::{PatientRepository, PatientRepositoryError};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenService, TokenServiceError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{NewUser, UserRepository, UserRepositoryError};
