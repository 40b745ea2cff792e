//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and ports, and remain testable without I/O by
//! substituting in-memory adapters.

use std::sync::Arc;

use crate::domain::ports::{
    DoctorRepository, MappingRepository, PatientRepository, TokenService, UserRepository,
};
use crate::domain::{DoctorService, MappingService, PatientService, RegistrationService};

/// Parameter object bundling the driven ports the HTTP layer is wired
/// over.
#[derive(Clone)]
pub struct HttpPorts {
    /// User account storage.
    pub users: Arc<dyn UserRepository>,
    /// Doctor registry storage.
    pub doctors: Arc<dyn DoctorRepository>,
    /// Patient record storage.
    pub patients: Arc<dyn PatientRepository>,
    /// Mapping storage.
    pub mappings: Arc<dyn MappingRepository>,
    /// Token issuance and resolution.
    pub tokens: Arc<dyn TokenService>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Account registration use-case.
    pub registration: RegistrationService,
    /// Doctor directory use-cases.
    pub doctors: DoctorService,
    /// Patient record use-cases.
    pub patients: PatientService,
    /// Mapping use-cases.
    pub mappings: MappingService,
    /// Token resolution for the bearer extractor.
    pub tokens: Arc<dyn TokenService>,
}

impl HttpState {
    /// Construct state by wiring the record services over a ports bundle.
    pub fn new(ports: HttpPorts) -> Self {
        let HttpPorts {
            users,
            doctors,
            patients,
            mappings,
            tokens,
        } = ports;
        Self {
            registration: RegistrationService::new(users, Arc::clone(&tokens)),
            doctors: DoctorService::new(Arc::clone(&doctors)),
            patients: PatientService::new(Arc::clone(&patients)),
            mappings: MappingService::new(mappings, patients, doctors),
            tokens,
        }
    }
}
