//! Patient-doctor mapping handlers.
//!
//! ```text
//! GET    /mappings                    authenticated, principal's mappings
//! POST   /mappings                    authenticated, patient owner only
//! GET    /mappings/{patientId}        authenticated, patient owner only
//! DELETE /mappings/delete/{id}        authenticated, assigner or owner
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{DoctorId, Error, Mapping, MappingId, MappingWithDoctor, PatientId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Principal;
use crate::inbound::http::state::HttpState;

/// Mapping payload for `POST /mappings`.
///
/// `assignedBy` may be sent but is ignored: the assigner is always the
/// authenticated principal.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MappingPayload {
    /// Referenced patient id.
    pub patient: Uuid,
    /// Referenced doctor id.
    pub doctor: Uuid,
    /// Ignored: the assigner cannot be chosen by the client.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub assigned_by: Option<Value>,
}

/// List the principal's mappings with doctor detail.
#[utoipa::path(
    get,
    path = "/mappings",
    responses(
        (status = 200, description = "Mappings for patients the principal owns", body = [MappingWithDoctor]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["mappings"],
    operation_id = "listMappings"
)]
#[get("/mappings")]
pub async fn list_mappings(
    state: web::Data<HttpState>,
    principal: Principal,
) -> ApiResult<web::Json<Vec<MappingWithDoctor>>> {
    let mappings = state.mappings.list(principal.user_id()).await?;
    Ok(web::Json(mappings))
}

/// Assign a doctor to a patient the principal owns.
#[utoipa::path(
    post,
    path = "/mappings",
    request_body = MappingPayload,
    responses(
        (status = 201, description = "Mapping created", body = Mapping),
        (status = 400, description = "Duplicate pair", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Patient not owned by caller", body = Error),
        (status = 404, description = "Patient or doctor not found", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["mappings"],
    operation_id = "createMapping"
)]
#[post("/mappings")]
pub async fn create_mapping(
    state: web::Data<HttpState>,
    principal: Principal,
    payload: web::Json<MappingPayload>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let mapping = state
        .mappings
        .create(
            principal.user_id(),
            PatientId::from_uuid(body.patient),
            DoctorId::from_uuid(body.doctor),
        )
        .await?;
    Ok(HttpResponse::Created().json(mapping))
}

/// List the mappings of one patient the principal owns.
#[utoipa::path(
    get,
    path = "/mappings/{patientId}",
    params(("patientId" = Uuid, Path, description = "Patient id")),
    responses(
        (status = 200, description = "The patient's mappings", body = [MappingWithDoctor]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Patient not owned by caller", body = Error),
        (status = 404, description = "Patient not found", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["mappings"],
    operation_id = "listMappingsByPatient"
)]
#[get("/mappings/{patient_id}")]
pub async fn list_mappings_by_patient(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Vec<MappingWithDoctor>>> {
    let mappings = state
        .mappings
        .list_by_patient(principal.user_id(), PatientId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(mappings))
}

/// Delete a mapping as its assigner or the patient's owner.
#[utoipa::path(
    delete,
    path = "/mappings/delete/{id}",
    params(("id" = Uuid, Path, description = "Mapping id")),
    responses(
        (status = 204, description = "Mapping deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller is neither assigner nor owner", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["mappings"],
    operation_id = "deleteMapping"
)]
#[delete("/mappings/delete/{id}")]
pub async fn delete_mapping(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state
        .mappings
        .delete(principal.user_id(), MappingId::from_uuid(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use crate::inbound::http::test_utils::{bearer, register_and_token, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};

    async fn create_entity<S, B>(app: &S, token: &str, uri: &str, body: Value) -> Value
    where
        S: actix_web::dev::Service<
                actix_http::Request,
                Response = actix_web::dev::ServiceResponse<B>,
                Error = actix_web::Error,
            >,
        B: actix_web::body::MessageBody,
    {
        let response = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri(uri)
                .insert_header(bearer(token))
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED, "create {uri} failed");
        serde_json::from_slice(&actix_test::read_body(response).await).expect("payload")
    }

    #[actix_web::test]
    async fn mapping_lifecycle_with_cascade_on_patient_delete() {
        let app = actix_test::init_service(test_app()).await;
        let owner = register_and_token(&app, "Ada Lovelace", "ada", "ada@example.org").await;

        let patient = create_entity(
            &app,
            &owner,
            "/patients",
            json!({ "firstName": "Jane", "lastName": "Doe" }),
        )
        .await;
        let doctor = create_entity(
            &app,
            &owner,
            "/doctors",
            json!({ "firstName": "Greg", "email": "greg@example.org" }),
        )
        .await;
        let patient_id = patient["id"].as_str().expect("patient id").to_owned();
        let doctor_id = doctor["id"].as_str().expect("doctor id").to_owned();

        let mapping = create_entity(
            &app,
            &owner,
            "/mappings",
            json!({ "patient": patient_id, "doctor": doctor_id }),
        )
        .await;
        assert_eq!(mapping["patientId"].as_str(), Some(patient_id.as_str()));

        // Second identical pair is a validation failure.
        let duplicate = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/mappings")
                .insert_header(bearer(&owner))
                .set_json(json!({ "patient": patient_id, "doctor": doctor_id }))
                .to_request(),
        )
        .await;
        assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);

        // Deleting the patient removes the mapping with it.
        let delete = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/patients/{patient_id}"))
                .insert_header(bearer(&owner))
                .to_request(),
        )
        .await;
        assert_eq!(delete.status(), StatusCode::NO_CONTENT);

        let lookup = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/mappings/{patient_id}"))
                .insert_header(bearer(&owner))
                .to_request(),
        )
        .await;
        assert_eq!(lookup.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn only_the_patient_owner_may_create_mappings() {
        let app = actix_test::init_service(test_app()).await;
        let owner = register_and_token(&app, "Ada Lovelace", "ada", "ada@example.org").await;
        let other = register_and_token(&app, "Grace Hopper", "grace", "grace@example.org").await;

        let patient = create_entity(
            &app,
            &owner,
            "/patients",
            json!({ "firstName": "Jane" }),
        )
        .await;
        let doctor = create_entity(
            &app,
            &other,
            "/doctors",
            json!({ "firstName": "Greg", "email": "greg@example.org" }),
        )
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/mappings")
                .insert_header(bearer(&other))
                .set_json(json!({ "patient": patient["id"], "doctor": doctor["id"] }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("payload");
        assert_eq!(
            body["message"],
            Value::String("You can only assign doctors to patients you created.".into())
        );
    }

    #[actix_web::test]
    async fn listing_by_patient_distinguishes_missing_from_foreign() {
        let app = actix_test::init_service(test_app()).await;
        let owner = register_and_token(&app, "Ada Lovelace", "ada", "ada@example.org").await;
        let other = register_and_token(&app, "Grace Hopper", "grace", "grace@example.org").await;

        let patient = create_entity(
            &app,
            &owner,
            "/patients",
            json!({ "firstName": "Jane" }),
        )
        .await;
        let patient_id = patient["id"].as_str().expect("patient id").to_owned();

        let missing = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/mappings/3fa85f64-5717-4562-b3fc-2c963f66afa6")
                .insert_header(bearer(&owner))
                .to_request(),
        )
        .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let foreign = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/mappings/{patient_id}"))
                .insert_header(bearer(&other))
                .to_request(),
        )
        .await;
        assert_eq!(foreign.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn deletion_rights_are_assigner_or_owner_only() {
        let app = actix_test::init_service(test_app()).await;
        let owner = register_and_token(&app, "Ada Lovelace", "ada", "ada@example.org").await;
        let stranger =
            register_and_token(&app, "Grace Hopper", "grace", "grace@example.org").await;

        let patient = create_entity(
            &app,
            &owner,
            "/patients",
            json!({ "firstName": "Jane" }),
        )
        .await;
        let doctor = create_entity(
            &app,
            &owner,
            "/doctors",
            json!({ "firstName": "Greg", "email": "greg@example.org" }),
        )
        .await;
        let mapping = create_entity(
            &app,
            &owner,
            "/mappings",
            json!({ "patient": patient["id"], "doctor": doctor["id"] }),
        )
        .await;
        let mapping_id = mapping["id"].as_str().expect("mapping id").to_owned();

        let foreign = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/mappings/delete/{mapping_id}"))
                .insert_header(bearer(&stranger))
                .to_request(),
        )
        .await;
        assert_eq!(foreign.status(), StatusCode::FORBIDDEN);

        let own = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/mappings/delete/{mapping_id}"))
                .insert_header(bearer(&owner))
                .to_request(),
        )
        .await;
        assert_eq!(own.status(), StatusCode::NO_CONTENT);

        let again = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/mappings/delete/{mapping_id}"))
                .insert_header(bearer(&owner))
                .to_request(),
        )
        .await;
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn lists_embed_doctor_detail() {
        let app = actix_test::init_service(test_app()).await;
        let owner = register_and_token(&app, "Ada Lovelace", "ada", "ada@example.org").await;

        let patient = create_entity(
            &app,
            &owner,
            "/patients",
            json!({ "firstName": "Jane" }),
        )
        .await;
        let doctor = create_entity(
            &app,
            &owner,
            "/doctors",
            json!({ "firstName": "Greg", "email": "greg@example.org", "specialty": "diagnostics" }),
        )
        .await;
        create_entity(
            &app,
            &owner,
            "/mappings",
            json!({ "patient": patient["id"], "doctor": doctor["id"] }),
        )
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/mappings")
                .insert_header(bearer(&owner))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("payload");
        let first = &body.as_array().expect("array")[0];
        assert_eq!(first["doctor"]["firstName"], Value::String("Greg".into()));
        assert_eq!(
            first["doctor"]["specialty"],
            Value::String("diagnostics".into())
        );
        assert_eq!(first["patientId"], patient["id"]);
    }
}
