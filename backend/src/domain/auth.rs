//! Registration and credential primitives.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.
//! Login and token refresh belong to the identity provider; this module
//! only covers what registration needs: validated account fields, password
//! digests, and the issued token pair.

use std::fmt;

use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::{EmailAddress, EmailValidationError};

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 8;

/// Domain error returned when registration payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    /// Display name was missing or blank once trimmed.
    EmptyName,
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Email was missing or malformed.
    InvalidEmail(EmailValidationError),
    /// Password was shorter than the minimum length.
    PasswordTooShort,
    /// Password consisted entirely of digits.
    PasswordAllNumeric,
}

impl fmt::Display for RegistrationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::InvalidEmail(inner) => write!(f, "{inner}"),
            Self::PasswordTooShort => {
                write!(f, "password must be at least {MIN_PASSWORD_LEN} characters")
            }
            Self::PasswordAllNumeric => write!(f, "password must not be entirely numeric"),
        }
    }
}

impl std::error::Error for RegistrationValidationError {}

impl From<EmailValidationError> for RegistrationValidationError {
    fn from(value: EmailValidationError) -> Self {
        Self::InvalidEmail(value)
    }
}

/// Validated registration request.
///
/// ## Invariants
/// - `first_name` is non-empty; the display name is split on the first
///   space, the remainder (possibly empty) becoming `last_name`.
/// - `username` is trimmed and non-empty.
/// - `password` satisfies the policy: at least eight characters and not
///   entirely numeric. It retains caller-provided whitespace to avoid
///   surprising credential comparisons, and is zeroized on drop.
///
/// # Examples
/// ```
/// use backend::domain::Registration;
///
/// let reg =
///     Registration::try_from_parts("Ada Lovelace", "ada", "ada@example.org", "correct horse")
///         .unwrap();
/// assert_eq!(reg.first_name(), "Ada");
/// assert_eq!(reg.last_name(), "Lovelace");
/// ```
#[derive(Debug, Clone)]
pub struct Registration {
    first_name: String,
    last_name: String,
    username: String,
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl Registration {
    /// Construct a registration from raw field inputs.
    pub fn try_from_parts(
        name: &str,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, RegistrationValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistrationValidationError::EmptyName);
        }
        let (first_name, last_name) = match name.split_once(' ') {
            Some((first, rest)) => (first.to_owned(), rest.trim().to_owned()),
            None => (name.to_owned(), String::new()),
        };

        let username = username.trim();
        if username.is_empty() {
            return Err(RegistrationValidationError::EmptyUsername);
        }

        let email = EmailAddress::new(email)?;

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(RegistrationValidationError::PasswordTooShort);
        }
        if password.chars().all(|c| c.is_ascii_digit()) {
            return Err(RegistrationValidationError::PasswordAllNumeric);
        }

        Ok(Self {
            first_name,
            last_name,
            username: username.to_owned(),
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Given name extracted from the display name.
    pub fn first_name(&self) -> &str {
        self.first_name.as_str()
    }

    /// Family name extracted from the display name; may be empty.
    pub fn last_name(&self) -> &str {
        self.last_name.as_str()
    }

    /// Username suitable for account lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Validated email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Raw password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Salted SHA-256 digest of a password, stored as `salt$hash` hex.
///
/// Verification lives with the out-of-scope login flow; registration only
/// needs to persist a digest so credentials are never stored in clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Derive a digest from a password with a fresh random salt.
    pub fn derive(password: &str) -> Self {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        Self::derive_with_salt(password, &salt)
    }

    fn derive_with_salt(password: &str, salt: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(password.as_bytes());
        let hash = hasher.finalize();
        Self(format!("{}${}", hex::encode(salt), hex::encode(hash)))
    }

    /// Stored representation.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Reconstruct from the stored representation without re-deriving.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

/// Issued bearer credentials: a short-lived access token and a longer-lived
/// refresh token. Raw token strings pass through to the client once and are
/// stored only as digests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TokenPair {
    /// Opaque access token presented as `Authorization: Bearer`.
    pub access: String,
    /// Opaque refresh token consumed by the identity provider's refresh
    /// flow.
    pub refresh: String,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "ada", "ada@example.org", "longenough", RegistrationValidationError::EmptyName)]
    #[case("  ", "ada", "ada@example.org", "longenough", RegistrationValidationError::EmptyName)]
    #[case("Ada", "", "ada@example.org", "longenough", RegistrationValidationError::EmptyUsername)]
    #[case("Ada", "ada", "nope", "longenough", RegistrationValidationError::InvalidEmail(crate::domain::EmailValidationError::Malformed))]
    #[case("Ada", "ada", "ada@example.org", "short", RegistrationValidationError::PasswordTooShort)]
    #[case("Ada", "ada", "ada@example.org", "12345678", RegistrationValidationError::PasswordAllNumeric)]
    fn invalid_registrations(
        #[case] name: &str,
        #[case] username: &str,
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: RegistrationValidationError,
    ) {
        let err = Registration::try_from_parts(name, username, email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("Ada Lovelace", "Ada", "Lovelace")]
    #[case("Ada", "Ada", "")]
    #[case("Ada Augusta Lovelace", "Ada", "Augusta Lovelace")]
    #[case("  Grace Hopper  ", "Grace", "Hopper")]
    fn splits_display_name_on_first_space(
        #[case] name: &str,
        #[case] first: &str,
        #[case] last: &str,
    ) {
        let reg = Registration::try_from_parts(name, "user", "u@example.org", "longenough")
            .expect("valid registration");
        assert_eq!(reg.first_name(), first);
        assert_eq!(reg.last_name(), last);
    }

    #[rstest]
    fn password_digest_is_salted() {
        let a = PasswordDigest::derive("correct horse");
        let b = PasswordDigest::derive("correct horse");
        // Fresh salts produce distinct stored values for the same password.
        assert_ne!(a, b);
        assert!(a.as_str().contains('$'));
    }

    #[rstest]
    fn password_digest_round_trips_stored_form() {
        let digest = PasswordDigest::derive("correct horse");
        let restored = PasswordDigest::from_stored(digest.as_str());
        assert_eq!(digest, restored);
    }
}
