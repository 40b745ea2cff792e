//! Patient record handlers.
//!
//! ```text
//! GET    /patients          authenticated, owner-scoped list
//! POST   /patients          authenticated, creator becomes owner
//! GET    /patients/{id}     authenticated, owner only
//! PUT    /patients/{id}     authenticated, owner only, full payload
//! PATCH  /patients/{id}     authenticated, owner only, partial payload
//! DELETE /patients/{id}     authenticated, owner only
//! ```
//!
//! A non-owned existing id answers 403, an unknown id 404; the two are
//! never conflated.

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::domain::{
    EmailValidationError, Error, Patient, PatientChanges, PatientDraft, PatientId,
    PatientValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Principal;
use crate::inbound::http::state::HttpState;

/// Patient payload for `POST` and `PUT`.
///
/// A client may send an `owner` field; it is accepted and discarded. The
/// owner is always the authenticated principal, assigned server-side.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientPayload {
    /// Given (first) name; required.
    pub first_name: String,
    /// Family (last) name.
    pub last_name: Option<String>,
    /// Date of birth (`YYYY-MM-DD`).
    pub date_of_birth: Option<NaiveDate>,
    /// Contact address.
    pub email: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Free-form clinical notes.
    pub notes: Option<String>,
    /// Ignored: the owner cannot be chosen by the client.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub owner: Option<Value>,
}

impl TryFrom<PatientPayload> for PatientDraft {
    type Error = PatientValidationError;

    fn try_from(value: PatientPayload) -> Result<Self, Self::Error> {
        // value.owner is deliberately dropped here; see the struct docs.
        Self::try_from_parts(
            &value.first_name,
            value.last_name.as_deref(),
            value.date_of_birth,
            value.email.as_deref(),
            value.phone.as_deref(),
            value.address.as_deref(),
            value.notes.as_deref(),
        )
    }
}

/// Partial patient payload for `PATCH`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientPatchPayload {
    /// Replacement given name.
    pub first_name: Option<String>,
    /// Replacement family name.
    pub last_name: Option<String>,
    /// Replacement date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Replacement contact address.
    pub email: Option<String>,
    /// Replacement phone number.
    pub phone: Option<String>,
    /// Replacement postal address.
    pub address: Option<String>,
    /// Replacement notes.
    pub notes: Option<String>,
    /// Ignored: the owner cannot be changed by the client.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub owner: Option<Value>,
}

impl TryFrom<PatientPatchPayload> for PatientChanges {
    type Error = PatientValidationError;

    fn try_from(value: PatientPatchPayload) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            value.first_name.as_deref(),
            value.last_name.as_deref(),
            value.date_of_birth,
            value.email.as_deref(),
            value.phone.as_deref(),
            value.address.as_deref(),
            value.notes.as_deref(),
        )
    }
}

fn map_patient_validation_error(err: PatientValidationError) -> Error {
    match err {
        PatientValidationError::EmptyFirstName => {
            Error::invalid_request("first name must not be empty")
                .with_details(json!({ "field": "firstName", "code": "empty_first_name" }))
        }
        PatientValidationError::InvalidEmail(EmailValidationError::Empty) => {
            Error::invalid_request("email must not be empty")
                .with_details(json!({ "field": "email", "code": "empty_email" }))
        }
        PatientValidationError::InvalidEmail(EmailValidationError::Malformed) => {
            Error::invalid_request("email is not a valid address")
                .with_details(json!({ "field": "email", "code": "invalid_email" }))
        }
    }
}

/// List the principal's patients, newest first.
#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "Owned patients, newest first", body = [Patient]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["patients"],
    operation_id = "listPatients"
)]
#[get("/patients")]
pub async fn list_patients(
    state: web::Data<HttpState>,
    principal: Principal,
) -> ApiResult<web::Json<Vec<Patient>>> {
    let patients = state.patients.list(principal.user_id()).await?;
    Ok(web::Json(patients))
}

/// Create a patient owned by the principal.
#[utoipa::path(
    post,
    path = "/patients",
    request_body = PatientPayload,
    responses(
        (status = 201, description = "Patient created", body = Patient),
        (status = 400, description = "Invalid fields", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["patients"],
    operation_id = "createPatient"
)]
#[post("/patients")]
pub async fn create_patient(
    state: web::Data<HttpState>,
    principal: Principal,
    payload: web::Json<PatientPayload>,
) -> ApiResult<HttpResponse> {
    let draft =
        PatientDraft::try_from(payload.into_inner()).map_err(map_patient_validation_error)?;
    let patient = state.patients.create(principal.user_id(), &draft).await?;
    Ok(HttpResponse::Created().json(patient))
}

/// Fetch one of the principal's patients.
#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = Uuid, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient", body = Patient),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["patients"],
    operation_id = "getPatient"
)]
#[get("/patients/{id}")]
pub async fn get_patient(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Patient>> {
    let patient = state
        .patients
        .fetch(principal.user_id(), PatientId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(patient))
}

/// Replace one of the principal's patients.
#[utoipa::path(
    put,
    path = "/patients/{id}",
    params(("id" = Uuid, Path, description = "Patient id")),
    request_body = PatientPayload,
    responses(
        (status = 200, description = "Patient replaced", body = Patient),
        (status = 400, description = "Invalid fields", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["patients"],
    operation_id = "replacePatient"
)]
#[put("/patients/{id}")]
pub async fn replace_patient(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<Uuid>,
    payload: web::Json<PatientPayload>,
) -> ApiResult<web::Json<Patient>> {
    let draft =
        PatientDraft::try_from(payload.into_inner()).map_err(map_patient_validation_error)?;
    let patient = state
        .patients
        .replace(
            principal.user_id(),
            PatientId::from_uuid(path.into_inner()),
            &draft,
        )
        .await?;
    Ok(web::Json(patient))
}

/// Apply partial changes to one of the principal's patients.
#[utoipa::path(
    patch,
    path = "/patients/{id}",
    params(("id" = Uuid, Path, description = "Patient id")),
    request_body = PatientPatchPayload,
    responses(
        (status = 200, description = "Patient updated", body = Patient),
        (status = 400, description = "Invalid fields", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["patients"],
    operation_id = "updatePatient"
)]
#[patch("/patients/{id}")]
pub async fn update_patient(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<Uuid>,
    payload: web::Json<PatientPatchPayload>,
) -> ApiResult<web::Json<Patient>> {
    let changes =
        PatientChanges::try_from(payload.into_inner()).map_err(map_patient_validation_error)?;
    let patient = state
        .patients
        .update(
            principal.user_id(),
            PatientId::from_uuid(path.into_inner()),
            &changes,
        )
        .await?;
    Ok(web::Json(patient))
}

/// Delete one of the principal's patients; its mappings go with it.
#[utoipa::path(
    delete,
    path = "/patients/{id}",
    params(("id" = Uuid, Path, description = "Patient id")),
    responses(
        (status = 204, description = "Patient deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["patients"],
    operation_id = "deletePatient"
)]
#[delete("/patients/{id}")]
pub async fn delete_patient(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state
        .patients
        .delete(principal.user_id(), PatientId::from_uuid(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
