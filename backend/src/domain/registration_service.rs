//! Account registration service.
//!
//! Registration is the one identity flow this repository serves: it stores
//! the account (credentials only as a salted digest) and asks the token
//! port for the initial access/refresh pair. Login and refresh belong to
//! the identity provider.

use std::sync::Arc;

use serde_json::json;

use crate::domain::ports::{
    NewUser, TokenService, TokenServiceError, UserRepository, UserRepositoryError,
};
use crate::domain::{Error, PasswordDigest, Registration, TokenPair, UserProfile};

/// A freshly registered account with its issued credentials.
#[derive(Debug, Clone)]
pub struct RegisteredAccount {
    /// The stored public profile.
    pub user: UserProfile,
    /// The issued bearer credentials.
    pub tokens: TokenPair,
}

/// Service creating accounts and handing out their first token pair.
#[derive(Clone)]
pub struct RegistrationService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenService>,
}

impl RegistrationService {
    /// Create a new service over the user store and token issuer.
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<dyn TokenService>) -> Self {
        Self { users, tokens }
    }

    fn map_user_error(error: UserRepositoryError) -> Error {
        match error {
            UserRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("user store unavailable: {message}"))
            }
            UserRepositoryError::Query { message } => {
                Error::internal(format!("user store error: {message}"))
            }
            UserRepositoryError::DuplicateUsername => {
                Error::invalid_request("username already registered")
                    .with_details(json!({ "field": "username", "code": "duplicate_username" }))
            }
            UserRepositoryError::DuplicateEmail => {
                Error::invalid_request("email already registered")
                    .with_details(json!({ "field": "email", "code": "duplicate_email" }))
            }
        }
    }

    fn map_token_error(error: TokenServiceError) -> Error {
        match error {
            TokenServiceError::Connection { message } => {
                Error::service_unavailable(format!("token store unavailable: {message}"))
            }
            TokenServiceError::Query { message } => {
                Error::internal(format!("token store error: {message}"))
            }
        }
    }

    /// Register a new account and issue its first token pair.
    pub async fn register(&self, registration: &Registration) -> Result<RegisteredAccount, Error> {
        let new_user = NewUser {
            username: registration.username().to_owned(),
            email: registration.email().clone(),
            first_name: registration.first_name().to_owned(),
            last_name: registration.last_name().to_owned(),
            password_digest: PasswordDigest::derive(registration.password()),
        };

        let user = self
            .users
            .insert(&new_user)
            .await
            .map_err(Self::map_user_error)?;
        let tokens = self
            .tokens
            .issue_pair(&user.id)
            .await
            .map_err(Self::map_token_error)?;

        Ok(RegisteredAccount { user, tokens })
    }
}
