//! Doctor registry types.
//!
//! Doctors form a shared directory: no record has an owner, and any
//! authenticated principal may mutate any entry. The types here only
//! enforce field validity; the sharing rule lives in
//! [`crate::domain::policy`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{EmailAddress, EmailValidationError};

/// Identifier of a doctor record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Uuid)]
pub struct DoctorId(Uuid);

impl DoctorId {
    /// Wrap an existing UUID.
    pub fn from_uuid(raw: Uuid) -> Self {
        Self(raw)
    }

    /// Generate a fresh random id.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for DoctorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored doctor profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    /// Record identifier.
    pub id: DoctorId,
    /// Given (first) name.
    pub first_name: String,
    /// Family (last) name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Globally unique contact address.
    pub email: EmailAddress,
    /// Medical specialty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    /// Contact phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Server-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Domain error returned when doctor field values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoctorValidationError {
    /// Given name was missing or blank once trimmed.
    EmptyFirstName,
    /// Email was missing or malformed.
    InvalidEmail(EmailValidationError),
}

impl fmt::Display for DoctorValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFirstName => write!(f, "first name must not be empty"),
            Self::InvalidEmail(inner) => write!(f, "{inner}"),
        }
    }
}

impl std::error::Error for DoctorValidationError {}

impl From<EmailValidationError> for DoctorValidationError {
    fn from(value: EmailValidationError) -> Self {
        Self::InvalidEmail(value)
    }
}

/// Validated payload for creating (or fully replacing) a doctor.
///
/// ## Invariants
/// - `first_name` is trimmed and non-empty.
/// - `email` is well-formed; global uniqueness is enforced at the storage
///   layer and re-checked by the service.
/// - Optional fields are trimmed; blank strings collapse to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorDraft {
    /// Given (first) name.
    pub first_name: String,
    /// Family (last) name.
    pub last_name: Option<String>,
    /// Contact address.
    pub email: EmailAddress,
    /// Medical specialty.
    pub specialty: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
}

impl DoctorDraft {
    /// Construct a draft from raw field inputs.
    pub fn try_from_parts(
        first_name: &str,
        last_name: Option<&str>,
        email: &str,
        specialty: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Self, DoctorValidationError> {
        let first_name = first_name.trim();
        if first_name.is_empty() {
            return Err(DoctorValidationError::EmptyFirstName);
        }
        Ok(Self {
            first_name: first_name.to_owned(),
            last_name: normalize_optional(last_name),
            email: EmailAddress::new(email)?,
            specialty: normalize_optional(specialty),
            phone: normalize_optional(phone),
        })
    }
}

/// Partial update applied by `PATCH`; absent fields keep their stored
/// values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorChanges {
    /// Replacement given name.
    pub first_name: Option<String>,
    /// Replacement family name.
    pub last_name: Option<String>,
    /// Replacement contact address.
    pub email: Option<EmailAddress>,
    /// Replacement specialty.
    pub specialty: Option<String>,
    /// Replacement phone number.
    pub phone: Option<String>,
}

impl DoctorChanges {
    /// Construct changes from raw optional inputs, validating those that
    /// are present.
    pub fn try_from_parts(
        first_name: Option<&str>,
        last_name: Option<&str>,
        email: Option<&str>,
        specialty: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Self, DoctorValidationError> {
        let first_name = match first_name {
            Some(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(DoctorValidationError::EmptyFirstName);
                }
                Some(trimmed.to_owned())
            }
            None => None,
        };
        let email = match email {
            Some(raw) => Some(EmailAddress::new(raw)?),
            None => None,
        };
        Ok(Self {
            first_name,
            last_name: normalize_optional(last_name),
            email,
            specialty: normalize_optional(specialty),
            phone: normalize_optional(phone),
        })
    }

    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.specialty.is_none()
            && self.phone.is_none()
    }
}

pub(crate) fn normalize_optional(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}
