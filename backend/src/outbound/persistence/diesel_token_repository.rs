//! PostgreSQL-backed `TokenRepository`.
//!
//! Storing a token also deletes every token that has already expired.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{TokenRepository, TokenRepositoryError};
use crate::domain::{TokenDigest, UserId, UserToken};

use super::diesel_error_mapping::DbFailure;
use super::models::UserTokenRow;
use super::pool::DbPool;
use super::schema::user_tokens;

/// Diesel implementation of [`TokenRepository`]. Only digests are stored.
#[derive(Clone)]
pub struct DieselTokenRepository {
    pool: DbPool,
}

impl DieselTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> TokenRepositoryError {
    match failure {
        DbFailure::Connection(message) => TokenRepositoryError::connection(message),
        DbFailure::Query(message) => TokenRepositoryError::query(message),
        DbFailure::Unique(_) | DbFailure::ForeignKey(_) => {
            TokenRepositoryError::query("constraint violation")
        }
    }
}

fn token_to_row(token: &UserToken) -> UserTokenRow {
    UserTokenRow {
        user_id: *token.user_id.as_uuid(),
        login_provider: token.login_provider.clone(),
        name: token.name.clone(),
        value: token.digest.as_str().to_owned(),
        expires_at: token.expires_at,
    }
}

fn row_to_token(row: UserTokenRow) -> UserToken {
    UserToken {
        user_id: UserId::from_uuid(row.user_id),
        login_provider: row.login_provider,
        name: row.name,
        digest: TokenDigest::from_stored(row.value),
        expires_at: row.expires_at,
    }
}

#[async_trait]
impl TokenRepository for DieselTokenRepository {
    async fn store(&self, token: &UserToken) -> Result<(), TokenRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        let row = token_to_row(token);
        conn.transaction::<_, DieselError, _>(|conn| {
            async move {
                let purged = diesel::delete(
                    user_tokens::table.filter(user_tokens::expires_at.le(diesel::dsl::now)),
                )
                .execute(conn)
                .await?;
                if purged > 0 {
                    debug!(purged, "purged expired access tokens");
                }
                diesel::insert_into(user_tokens::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_failure(err.into()))
    }

    async fn find_active(
        &self,
        digest: &TokenDigest,
        now: DateTime<Utc>,
    ) -> Result<Option<UserToken>, TokenRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        let row = user_tokens::table
            .filter(user_tokens::value.eq(digest.as_str()))
            .filter(user_tokens::expires_at.gt(now))
            .select(UserTokenRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_failure(err.into()))?;
        Ok(row.map(row_to_token))
    }

    async fn revoke(&self, digest: &TokenDigest) -> Result<(), TokenRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(err.into()))?;
        diesel::delete(user_tokens::table.filter(user_tokens::value.eq(digest.as_str())))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_failure(err.into()))
    }
}
