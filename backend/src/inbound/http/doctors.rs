//! Doctor directory handlers.
//!
//! ```text
//! GET    /doctors           public
//! POST   /doctors           authenticated
//! GET    /doctors/{id}      public
//! PUT    /doctors/{id}      authenticated, full payload
//! PATCH  /doctors/{id}      authenticated, partial payload
//! DELETE /doctors/{id}      authenticated
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    Doctor, DoctorChanges, DoctorDraft, DoctorId, DoctorValidationError, EmailValidationError,
    Error,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Principal;
use crate::inbound::http::state::HttpState;

/// Doctor payload for `POST` and `PUT`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorPayload {
    /// Given (first) name; required.
    pub first_name: String,
    /// Family (last) name.
    pub last_name: Option<String>,
    /// Globally unique contact address; required.
    pub email: String,
    /// Medical specialty.
    pub specialty: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
}

impl TryFrom<DoctorPayload> for DoctorDraft {
    type Error = DoctorValidationError;

    fn try_from(value: DoctorPayload) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            &value.first_name,
            value.last_name.as_deref(),
            &value.email,
            value.specialty.as_deref(),
            value.phone.as_deref(),
        )
    }
}

/// Partial doctor payload for `PATCH`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorPatchPayload {
    /// Replacement given name.
    pub first_name: Option<String>,
    /// Replacement family name.
    pub last_name: Option<String>,
    /// Replacement contact address.
    pub email: Option<String>,
    /// Replacement specialty.
    pub specialty: Option<String>,
    /// Replacement phone number.
    pub phone: Option<String>,
}

impl TryFrom<DoctorPatchPayload> for DoctorChanges {
    type Error = DoctorValidationError;

    fn try_from(value: DoctorPatchPayload) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            value.first_name.as_deref(),
            value.last_name.as_deref(),
            value.email.as_deref(),
            value.specialty.as_deref(),
            value.phone.as_deref(),
        )
    }
}

fn map_doctor_validation_error(err: DoctorValidationError) -> Error {
    match err {
        DoctorValidationError::EmptyFirstName => {
            Error::invalid_request("first name must not be empty")
                .with_details(json!({ "field": "firstName", "code": "empty_first_name" }))
        }
        DoctorValidationError::InvalidEmail(EmailValidationError::Empty) => {
            Error::invalid_request("email must not be empty")
                .with_details(json!({ "field": "email", "code": "empty_email" }))
        }
        DoctorValidationError::InvalidEmail(EmailValidationError::Malformed) => {
            Error::invalid_request("email is not a valid address")
                .with_details(json!({ "field": "email", "code": "invalid_email" }))
        }
    }
}

/// List the doctor directory. Open to anonymous callers.
#[utoipa::path(
    get,
    path = "/doctors",
    responses(
        (status = 200, description = "Doctors, newest first", body = [Doctor]),
        (status = 500, description = "Internal server error")
    ),
    tags = ["doctors"],
    operation_id = "listDoctors",
    security([])
)]
#[get("/doctors")]
pub async fn list_doctors(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Doctor>>> {
    let doctors = state.doctors.list().await?;
    Ok(web::Json(doctors))
}

/// Create a doctor record.
#[utoipa::path(
    post,
    path = "/doctors",
    request_body = DoctorPayload,
    responses(
        (status = 201, description = "Doctor created", body = Doctor),
        (status = 400, description = "Invalid or duplicate fields", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["doctors"],
    operation_id = "createDoctor"
)]
#[post("/doctors")]
pub async fn create_doctor(
    state: web::Data<HttpState>,
    principal: Principal,
    payload: web::Json<DoctorPayload>,
) -> ApiResult<HttpResponse> {
    let draft =
        DoctorDraft::try_from(payload.into_inner()).map_err(map_doctor_validation_error)?;
    let doctor = state.doctors.create(principal.user_id(), &draft).await?;
    Ok(HttpResponse::Created().json(doctor))
}

/// Fetch one doctor. Open to anonymous callers.
#[utoipa::path(
    get,
    path = "/doctors/{id}",
    params(("id" = Uuid, Path, description = "Doctor id")),
    responses(
        (status = 200, description = "Doctor", body = Doctor),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["doctors"],
    operation_id = "getDoctor",
    security([])
)]
#[get("/doctors/{id}")]
pub async fn get_doctor(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Doctor>> {
    let doctor = state
        .doctors
        .fetch(DoctorId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(doctor))
}

/// Replace a doctor's profile.
#[utoipa::path(
    put,
    path = "/doctors/{id}",
    params(("id" = Uuid, Path, description = "Doctor id")),
    request_body = DoctorPayload,
    responses(
        (status = 200, description = "Doctor replaced", body = Doctor),
        (status = 400, description = "Invalid or duplicate fields", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["doctors"],
    operation_id = "replaceDoctor"
)]
#[put("/doctors/{id}")]
pub async fn replace_doctor(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<Uuid>,
    payload: web::Json<DoctorPayload>,
) -> ApiResult<web::Json<Doctor>> {
    let draft =
        DoctorDraft::try_from(payload.into_inner()).map_err(map_doctor_validation_error)?;
    let doctor = state
        .doctors
        .replace(
            principal.user_id(),
            DoctorId::from_uuid(path.into_inner()),
            &draft,
        )
        .await?;
    Ok(web::Json(doctor))
}

/// Apply partial changes to a doctor.
#[utoipa::path(
    patch,
    path = "/doctors/{id}",
    params(("id" = Uuid, Path, description = "Doctor id")),
    request_body = DoctorPatchPayload,
    responses(
        (status = 200, description = "Doctor updated", body = Doctor),
        (status = 400, description = "Invalid or duplicate fields", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["doctors"],
    operation_id = "updateDoctor"
)]
#[patch("/doctors/{id}")]
pub async fn update_doctor(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<Uuid>,
    payload: web::Json<DoctorPatchPayload>,
) -> ApiResult<web::Json<Doctor>> {
    let changes =
        DoctorChanges::try_from(payload.into_inner()).map_err(map_doctor_validation_error)?;
    let doctor = state
        .doctors
        .update(
            principal.user_id(),
            DoctorId::from_uuid(path.into_inner()),
            &changes,
        )
        .await?;
    Ok(web::Json(doctor))
}

/// Delete a doctor; its mappings go with it.
#[utoipa::path(
    delete,
    path = "/doctors/{id}",
    params(("id" = Uuid, Path, description = "Doctor id")),
    responses(
        (status = 204, description = "Doctor deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["doctors"],
    operation_id = "deleteDoctor"
)]
#[delete("/doctors/{id}")]
pub async fn delete_doctor(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state
        .doctors
        .delete(principal.user_id(), DoctorId::from_uuid(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
