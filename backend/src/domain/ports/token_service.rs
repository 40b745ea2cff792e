//! Driven port for the identity-provider collaborator.
//!
//! The API never inspects token contents: issuance at registration and
//! access-token resolution are the only contact points, and both go
//! through this trait. Login and refresh flows stay with the identity
//! provider and are not served by this repository.

use async_trait::async_trait;

use crate::domain::{TokenPair, UserId};

/// Errors raised by token service adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenServiceError {
    /// Token store connection could not be established.
    #[error("token store connection failed: {message}")]
    Connection {
        /// Driver-level failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("token store query failed: {message}")]
    Query {
        /// Driver-level failure description.
        message: String,
    },
}

impl TokenServiceError {
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

/// Port for issuing and resolving bearer credentials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenService: Send + Sync {
    /// Issue a fresh access/refresh pair for `user`.
    async fn issue_pair(&self, user: &UserId) -> Result<TokenPair, TokenServiceError>;

    /// Resolve a presented access token to its principal.
    ///
    /// Returns `None` for unknown, expired, or non-access tokens; the
    /// caller maps that to an authentication failure.
    async fn resolve_access(&self, token: &str) -> Result<Option<UserId>, TokenServiceError>;
}
