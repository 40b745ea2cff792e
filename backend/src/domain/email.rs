//! Validated email address newtype shared by user, doctor, and patient
//! records.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Domain error returned when an email string is not well-formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailValidationError {
    /// The address was blank once trimmed.
    Empty,
    /// The address did not have the `local@domain.tld` shape.
    Malformed,
}

impl fmt::Display for EmailValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "email must not be empty"),
            Self::Malformed => write!(f, "email is not a valid address"),
        }
    }
}

impl std::error::Error for EmailValidationError {}

/// A syntactically valid email address.
///
/// ## Invariants
/// - Trimmed, non-empty, no interior whitespace.
/// - Exactly one `@` with a non-empty local part and a domain containing a
///   dot that is neither leading nor trailing.
///
/// # Examples
/// ```
/// use backend::domain::EmailAddress;
///
/// let email = EmailAddress::new("ada@example.org").unwrap();
/// assert_eq!(email.as_str(), "ada@example.org");
/// assert!(EmailAddress::new("not-an-email").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "ada@example.org")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parse and validate an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, EmailValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EmailValidationError::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(EmailValidationError::Malformed);
        }
        let mut parts = trimmed.splitn(2, '@');
        let local = parts.next().unwrap_or_default();
        let Some(domain) = parts.next() else {
            return Err(EmailValidationError::Malformed);
        };
        if local.is_empty() || domain.contains('@') {
            return Err(EmailValidationError::Malformed);
        }
        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(EmailValidationError::Malformed);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The validated address as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = EmailValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ada@example.org")]
    #[case("  ada@example.org  ")]
    #[case("a.b+c@sub.example.co")]
    fn accepts_well_formed_addresses(#[case] raw: &str) {
        let email = EmailAddress::new(raw).expect("valid address");
        assert_eq!(email.as_str(), raw.trim());
    }

    #[rstest]
    #[case("", EmailValidationError::Empty)]
    #[case("   ", EmailValidationError::Empty)]
    #[case("no-at-sign", EmailValidationError::Malformed)]
    #[case("@example.org", EmailValidationError::Malformed)]
    #[case("ada@nodot", EmailValidationError::Malformed)]
    #[case("ada@.example", EmailValidationError::Malformed)]
    #[case("ada@example.", EmailValidationError::Malformed)]
    #[case("ada smith@example.org", EmailValidationError::Malformed)]
    fn rejects_malformed_addresses(#[case] raw: &str, #[case] expected: EmailValidationError) {
        let err = EmailAddress::new(raw).expect_err("invalid address");
        assert_eq!(err, expected);
    }
}
