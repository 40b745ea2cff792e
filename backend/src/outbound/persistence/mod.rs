//! PostgreSQL persistence adapters built on Diesel.
//!
//! Each repository port gets one adapter; they share the bb8 connection
//! pool, the Diesel schema, and the error-mapping helpers. Row structs stay
//! private to this module; the domain only ever sees its own types.

mod diesel_doctor_repository;
mod diesel_mapping_repository;
mod diesel_patient_repository;
mod diesel_token_service;
mod diesel_user_repository;
mod error_mapping;
mod models;
mod pool;
pub mod schema;

pub use diesel_doctor_repository::DieselDoctorRepository;
pub use diesel_mapping_repository::DieselMappingRepository;
pub use diesel_patient_repository::DieselPatientRepository;
pub use diesel_token_service::DieselTokenService;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
