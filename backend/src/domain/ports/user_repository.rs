//! Port abstraction for user account persistence adapters and their
//! errors.

use async_trait::async_trait;

use crate::domain::{EmailAddress, PasswordDigest, UserId, UserProfile};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection {
        /// Driver-level failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query {
        /// Driver-level failure description.
        message: String,
    },
    /// The username is already taken.
    #[error("username already registered")]
    DuplicateUsername,
    /// The email is already registered to another account.
    #[error("email already registered")]
    DuplicateEmail,
}

impl UserRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Insert payload for a new account. The digest is derived before the
/// repository is involved; raw passwords never reach an adapter.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Unique login name.
    pub username: String,
    /// Unique contact address.
    pub email: EmailAddress,
    /// Given (first) name.
    pub first_name: String,
    /// Family (last) name; may be empty.
    pub last_name: String,
    /// Salted password digest.
    pub password_digest: PasswordDigest,
}

/// Port for user account storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account, enforcing username and email uniqueness.
    async fn insert(&self, new_user: &NewUser) -> Result<UserProfile, UserRepositoryError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, UserRepositoryError>;
}
