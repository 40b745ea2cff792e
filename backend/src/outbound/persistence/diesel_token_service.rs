//! Database-backed token issuance and resolution.
//!
//! Tokens are opaque 32-byte random strings, hex-encoded. Only their
//! SHA-256 digests are stored; a presented token is re-digested and looked
//! up. Expired rows simply never match — pruning them is housekeeping the
//! store can do at leisure, not a correctness concern.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::ports::{TokenService, TokenServiceError};
use crate::domain::{TokenPair, UserId};

use super::error_mapping::{DieselFailure, classify};
use super::models::NewAuthTokenRow;
use super::pool::{DbPool, PoolError};
use super::schema::auth_tokens;

const ACCESS_KIND: &str = "access";
const REFRESH_KIND: &str = "refresh";
const ACCESS_TTL_HOURS: i64 = 1;
const REFRESH_TTL_DAYS: i64 = 14;

/// Diesel-backed implementation of the `TokenService` port.
#[derive(Clone)]
pub struct DieselTokenService {
    pool: DbPool,
}

impl DieselTokenService {
    /// Create a new token service with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TokenServiceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            TokenServiceError::connection(message)
        }
    }
}

fn map_diesel_error(error: &diesel::result::Error) -> TokenServiceError {
    match classify(error) {
        DieselFailure::Connection(message) => TokenServiceError::connection(message),
        DieselFailure::Query(message) => TokenServiceError::query(message),
        // The digest column is the primary key; colliding SHA-256 output
        // from distinct random tokens is not a practical concern.
        DieselFailure::UniqueViolation(_) => {
            TokenServiceError::query("token digest collision")
        }
    }
}

fn fresh_token() -> String {
    let mut material = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut material);
    hex::encode(material)
}

fn digest_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl TokenService for DieselTokenService {
    async fn issue_pair(&self, user: &UserId) -> Result<TokenPair, TokenServiceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let access = fresh_token();
        let refresh = fresh_token();
        let now = Utc::now();
        let access_digest = digest_token(&access);
        let refresh_digest = digest_token(&refresh);
        let rows = [
            NewAuthTokenRow {
                digest: &access_digest,
                user_id: *user.as_uuid(),
                kind: ACCESS_KIND,
                expires_at: now + Duration::hours(ACCESS_TTL_HOURS),
            },
            NewAuthTokenRow {
                digest: &refresh_digest,
                user_id: *user.as_uuid(),
                kind: REFRESH_KIND,
                expires_at: now + Duration::days(REFRESH_TTL_DAYS),
            },
        ];

        diesel::insert_into(auth_tokens::table)
            .values(&rows[..])
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;

        Ok(TokenPair { access, refresh })
    }

    async fn resolve_access(&self, token: &str) -> Result<Option<UserId>, TokenServiceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let digest = digest_token(token);
        let user_id: Option<Uuid> = auth_tokens::table
            .filter(auth_tokens::digest.eq(&digest))
            .filter(auth_tokens::kind.eq(ACCESS_KIND))
            .filter(auth_tokens::expires_at.gt(Utc::now()))
            .select(auth_tokens::user_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err))?;

        Ok(user_id.map(UserId::from_uuid))
    }
}
