//! Account registration handler.
//!
//! ```text
//! POST /auth/register {"name":"Ada Lovelace","username":"ada","email":"ada@example.org","password":"..."}
//! ```
//!
//! Login and token refresh are the identity provider's endpoints and are
//! not served here.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    EmailValidationError, Error, Registration, RegistrationValidationError, UserProfile,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Registration request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name; split on the first space into given/family parts.
    pub name: String,
    /// Unique login name.
    pub username: String,
    /// Unique contact address.
    pub email: String,
    /// Password; at least eight characters, not entirely numeric.
    pub password: String,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = RegistrationValidationError;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.name, &value.username, &value.email, &value.password)
    }
}

/// Public user fields echoed back after registration.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    /// Unique login name.
    pub username: String,
    /// Unique contact address.
    pub email: String,
    /// Given (first) name.
    pub first_name: String,
    /// Family (last) name; may be empty.
    pub last_name: String,
}

impl From<UserProfile> for RegisteredUser {
    fn from(profile: UserProfile) -> Self {
        Self {
            username: profile.username,
            email: profile.email.into(),
            first_name: profile.first_name,
            last_name: profile.last_name,
        }
    }
}

/// Registration response: public user fields plus the issued tokens.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    /// The created account's public fields.
    pub user: RegisteredUser,
    /// Opaque access token for `Authorization: Bearer`.
    pub access: String,
    /// Opaque refresh token for the identity provider's refresh flow.
    pub refresh: String,
}

fn map_registration_validation_error(err: RegistrationValidationError) -> Error {
    match err {
        RegistrationValidationError::EmptyName => Error::invalid_request("name must not be empty")
            .with_details(json!({ "field": "name", "code": "empty_name" })),
        RegistrationValidationError::EmptyUsername => {
            Error::invalid_request("username must not be empty")
                .with_details(json!({ "field": "username", "code": "empty_username" }))
        }
        RegistrationValidationError::InvalidEmail(EmailValidationError::Empty) => {
            Error::invalid_request("email must not be empty")
                .with_details(json!({ "field": "email", "code": "empty_email" }))
        }
        RegistrationValidationError::InvalidEmail(EmailValidationError::Malformed) => {
            Error::invalid_request("email is not a valid address")
                .with_details(json!({ "field": "email", "code": "invalid_email" }))
        }
        RegistrationValidationError::PasswordTooShort => {
            Error::invalid_request("password must be at least 8 characters")
                .with_details(json!({ "field": "password", "code": "password_too_short" }))
        }
        RegistrationValidationError::PasswordAllNumeric => {
            Error::invalid_request("password must not be entirely numeric")
                .with_details(json!({ "field": "password", "code": "password_all_numeric" }))
        }
    }
}

/// Register a new account and issue its first token pair.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid or duplicate fields", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration =
        Registration::try_from(payload.into_inner()).map_err(map_registration_validation_error)?;
    let account = state.registration.register(&registration).await?;
    let response = RegisterResponse {
        user: RegisteredUser::from(account.user),
        access: account.tokens.access,
        refresh: account.tokens.refresh,
    };
    Ok(HttpResponse::Created().json(response))
}
