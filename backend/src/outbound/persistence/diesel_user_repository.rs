//! PostgreSQL-backed `UserRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{NewUser, UserRepository, UserRepositoryError};
use crate::domain::{EmailAddress, UserId, UserProfile};

use super::error_mapping::{DieselFailure, classify, violates};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: &diesel::result::Error) -> UserRepositoryError {
    let failure = classify(error);
    // Username is checked first: with an anonymous violation (no constraint
    // name from the driver) the duplicate cannot be attributed, and the
    // username is the more likely collision.
    if violates(&failure, USERNAME_CONSTRAINT) {
        return UserRepositoryError::DuplicateUsername;
    }
    if violates(&failure, EMAIL_CONSTRAINT) {
        return UserRepositoryError::DuplicateEmail;
    }
    match failure {
        DieselFailure::Connection(message) => UserRepositoryError::connection(message),
        DieselFailure::Query(message) => UserRepositoryError::query(message),
        DieselFailure::UniqueViolation(name) => UserRepositoryError::query(format!(
            "unexpected unique violation: {}",
            name.unwrap_or_else(|| "unknown constraint".to_owned())
        )),
    }
}

fn row_to_profile(row: UserRow) -> Result<UserProfile, UserRepositoryError> {
    let email = EmailAddress::new(&row.email)
        .map_err(|err| UserRepositoryError::query(format!("stored email is invalid: {err}")))?;
    Ok(UserProfile {
        id: UserId::from_uuid(row.id),
        username: row.username,
        email,
        first_name: row.first_name,
        last_name: row.last_name,
        created_at: row.created_at,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, new_user: &NewUser) -> Result<UserProfile, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            id: Uuid::new_v4(),
            username: &new_user.username,
            email: new_user.email.as_str(),
            first_name: &new_user.first_name,
            last_name: &new_user.last_name,
            password_digest: new_user.password_digest.as_str(),
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;
        row_to_profile(row)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err))?;
        row.map(row_to_profile).transpose()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the pure mapping helpers.
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    #[rstest]
    fn row_converts_to_profile_without_credentials() {
        let row = UserRow {
            id: Uuid::new_v4(),
            username: "ada".into(),
            email: "ada@example.org".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            password_digest: "salt$hash".into(),
            created_at: Utc::now(),
        };

        let profile = row_to_profile(row).expect("valid row");
        assert_eq!(profile.username, "ada");
        // UserProfile has no credential field; nothing further to assert.
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(repo_err, UserRepositoryError::Connection { .. }));
    }
}
