//! OpenAPI document assembled from the handler annotations.

use utoipa::OpenApi;

use crate::domain::{Doctor, Error, ErrorCode, Mapping, MappingWithDoctor, Patient};
use crate::inbound::http::accounts::{RegisterRequest, RegisterResponse, RegisteredUser};
use crate::inbound::http::doctors::{DoctorPatchPayload, DoctorPayload};
use crate::inbound::http::mappings::MappingPayload;
use crate::inbound::http::patients::{PatientPatchPayload, PatientPayload};
use crate::inbound::http::{accounts, doctors, health, mappings, patients};

/// Public OpenAPI surface used by Swagger UI and tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Healthcare Records API",
        description = "Multi-tenant patient records with a shared doctor directory."
    ),
    paths(
        accounts::register,
        doctors::list_doctors,
        doctors::create_doctor,
        doctors::get_doctor,
        doctors::replace_doctor,
        doctors::update_doctor,
        doctors::delete_doctor,
        patients::list_patients,
        patients::create_patient,
        patients::get_patient,
        patients::replace_patient,
        patients::update_patient,
        patients::delete_patient,
        mappings::list_mappings,
        mappings::create_mapping,
        mappings::list_mappings_by_patient,
        mappings::delete_mapping,
        health::live,
        health::ready,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Doctor,
        Patient,
        Mapping,
        MappingWithDoctor,
        RegisterRequest,
        RegisterResponse,
        RegisteredUser,
        DoctorPayload,
        DoctorPatchPayload,
        PatientPayload,
        PatientPatchPayload,
        MappingPayload,
    )),
    tags(
        (name = "auth", description = "Account registration"),
        (name = "doctors", description = "Shared doctor directory"),
        (name = "patients", description = "Owner-scoped patient records"),
        (name = "mappings", description = "Patient-doctor associations"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/auth/register",
            "/doctors",
            "/doctors/{id}",
            "/patients",
            "/patients/{id}",
            "/mappings",
            "/mappings/{patientId}",
            "/mappings/delete/{id}",
            "/healthz/live",
            "/healthz/ready",
        ] {
            assert!(
                paths.iter().any(|p| *p == expected),
                "missing path {expected}"
            );
        }
    }
}
