//! User identity types: the principal making requests and its stored
//! profile.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::EmailAddress;

/// Identifier of an authenticated principal (a user account).
///
/// Every record service and policy call takes the principal explicitly; it
/// is never read from ambient state.
///
/// # Examples
/// ```
/// use backend::domain::UserId;
///
/// let id = UserId::parse("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
/// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Uuid)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse an id from its canonical string form.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, uuid::Error> {
        Uuid::parse_str(raw.as_ref()).map(Self)
    }

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

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public view of a stored user account. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Account identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Unique contact address.
    pub email: EmailAddress,
    /// Given (first) name.
    pub first_name: String,
    /// Family (last) name; empty when registration supplied a single-word
    /// name.
    pub last_name: String,
    /// Server-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parse_rejects_non_uuid_input() {
        assert!(UserId::parse("not-a-uuid").is_err());
    }

    #[rstest]
    fn random_ids_are_distinct() {
        assert_ne!(UserId::random(), UserId::random());
    }

    #[rstest]
    fn serializes_as_bare_uuid() {
        let id = UserId::parse("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("fixture id");
        let value = serde_json::to_value(id).expect("serializable id");
        assert_eq!(value, serde_json::json!("3fa85f64-5717-4562-b3fc-2c963f66afa6"));
    }
}
