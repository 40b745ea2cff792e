//! Patient record types.
//!
//! Every patient has exactly one owner, assigned at creation from the
//! authenticated principal and never reassigned through the public
//! contract. The owner field is server-assigned: any owner supplied by a
//! client payload is ignored at the write boundary.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::doctor::normalize_optional;
use crate::domain::{EmailAddress, EmailValidationError, UserId};

/// Identifier of a patient record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Uuid)]
pub struct PatientId(Uuid);

impl PatientId {
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

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored patient record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Record identifier.
    pub id: PatientId,
    /// Owning principal; immutable after creation.
    pub owner_id: UserId,
    /// Given (first) name.
    pub first_name: String,
    /// Family (last) name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Date of birth.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    /// Contact address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailAddress>,
    /// Contact phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Postal address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Free-form clinical notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Server-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Domain error returned when patient field values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientValidationError {
    /// Given name was missing or blank once trimmed.
    EmptyFirstName,
    /// Email was present but malformed.
    InvalidEmail(EmailValidationError),
}

impl fmt::Display for PatientValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFirstName => write!(f, "first name must not be empty"),
            Self::InvalidEmail(inner) => write!(f, "{inner}"),
        }
    }
}

impl std::error::Error for PatientValidationError {}

impl From<EmailValidationError> for PatientValidationError {
    fn from(value: EmailValidationError) -> Self {
        Self::InvalidEmail(value)
    }
}

/// Validated payload for creating (or fully replacing) a patient.
///
/// ## Invariants
/// - `first_name` is trimmed and non-empty.
/// - `email`, when present, is well-formed.
/// - Optional text fields are trimmed; blank strings collapse to `None`.
/// - The draft never carries an owner: ownership comes from the principal
///   at the service boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientDraft {
    /// Given (first) name.
    pub first_name: String,
    /// Family (last) name.
    pub last_name: Option<String>,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Contact address.
    pub email: Option<EmailAddress>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Free-form clinical notes.
    pub notes: Option<String>,
}

impl PatientDraft {
    /// Construct a draft from raw field inputs.
    pub fn try_from_parts(
        first_name: &str,
        last_name: Option<&str>,
        date_of_birth: Option<NaiveDate>,
        email: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Self, PatientValidationError> {
        let first_name = first_name.trim();
        if first_name.is_empty() {
            return Err(PatientValidationError::EmptyFirstName);
        }
        let email = match normalize_optional(email) {
            Some(raw) => Some(EmailAddress::new(raw)?),
            None => None,
        };
        Ok(Self {
            first_name: first_name.to_owned(),
            last_name: normalize_optional(last_name),
            date_of_birth,
            email,
            phone: normalize_optional(phone),
            address: normalize_optional(address),
            notes: normalize_optional(notes),
        })
    }
}

/// Partial update applied by `PATCH`; absent fields keep their stored
/// values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientChanges {
    /// Replacement given name.
    pub first_name: Option<String>,
    /// Replacement family name.
    pub last_name: Option<String>,
    /// Replacement date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Replacement contact address.
    pub email: Option<EmailAddress>,
    /// Replacement phone number.
    pub phone: Option<String>,
    /// Replacement postal address.
    pub address: Option<String>,
    /// Replacement notes.
    pub notes: Option<String>,
}

impl PatientChanges {
    /// Construct changes from raw optional inputs, validating those that
    /// are present.
    pub fn try_from_parts(
        first_name: Option<&str>,
        last_name: Option<&str>,
        date_of_birth: Option<NaiveDate>,
        email: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Self, PatientValidationError> {
        let first_name = match first_name {
            Some(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(PatientValidationError::EmptyFirstName);
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
            date_of_birth,
            email,
            phone: normalize_optional(phone),
            address: normalize_optional(address),
            notes: normalize_optional(notes),
        })
    }

    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.date_of_birth.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.notes.is_none()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn draft_rejects_blank_first_name() {
        let err = PatientDraft::try_from_parts("  ", None, None, None, None, None, None)
            .expect_err("blank name must fail");
        assert_eq!(err, PatientValidationError::EmptyFirstName);
    }

    #[rstest]
    fn draft_rejects_malformed_email() {
        let err =
            PatientDraft::try_from_parts("Jane", None, None, Some("nope"), None, None, None)
                .expect_err("malformed email must fail");
        assert!(matches!(err, PatientValidationError::InvalidEmail(_)));
    }

    #[rstest]
    fn draft_treats_blank_email_as_absent() {
        let draft =
            PatientDraft::try_from_parts("Jane", None, None, Some("   "), None, None, None)
                .expect("blank email collapses to none");
        assert_eq!(draft.email, None);
    }

    #[rstest]
    fn draft_never_carries_an_owner() {
        // The type has no owner field at all; ownership is assigned by the
        // service from the authenticated principal.
        let draft = PatientDraft::try_from_parts(
            "Jane",
            Some("Doe"),
            NaiveDate::from_ymd_opt(1990, 4, 1),
            Some("jane@example.org"),
            None,
            Some(" 12 Elm Street "),
            None,
        )
        .expect("valid draft");
        assert_eq!(draft.address.as_deref(), Some("12 Elm Street"));
    }

    #[rstest]
    fn changes_validate_present_fields_only() {
        let changes = PatientChanges::try_from_parts(
            None,
            Some("Doe"),
            None,
            None,
            Some("555-0100"),
            None,
            None,
        )
        .expect("partial changes are valid");
        assert_eq!(changes.first_name, None);
        assert_eq!(changes.phone.as_deref(), Some("555-0100"));
        assert!(!changes.is_empty());
    }
}
